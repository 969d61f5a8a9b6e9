//! Minimum-update-interval parsing.

use chrono::Duration;

/// Parse a minimum update interval spec such as `"10 MINUTES"` or `"2 days"`.
///
/// The grammar is an integer count followed by a whitespace-separated unit,
/// case-insensitive: `MIN`/`MINS`/`MINUTE`/`MINUTES`, `HOUR`/`HOURS`,
/// `DAY`/`DAYS`. Anything else (a missing spec, a non-integer count, an
/// unknown unit, trailing tokens) yields [`Duration::zero`].
///
/// A zero result means "no minimum-interval gating": the reconciler then
/// skips purely on IP equality and never re-applies an unchanged address.
pub fn min_update_interval(spec: Option<&str>) -> Duration {
    let mut parts = match spec {
        Some(spec) => spec.split_whitespace(),
        None => return Duration::zero(),
    };

    let count = parts.next().and_then(|n| n.parse::<u32>().ok());
    let unit = parts.next().map(str::to_ascii_uppercase);

    let (count, unit) = match (count, unit, parts.next()) {
        (Some(count), Some(unit), None) => (i64::from(count), unit),
        _ => return Duration::zero(),
    };

    match unit.as_str() {
        "MIN" | "MINS" | "MINUTE" | "MINUTES" => Duration::minutes(count),
        "HOUR" | "HOURS" => Duration::hours(count),
        "DAY" | "DAYS" => Duration::days(count),
        _ => Duration::zero(),
    }
}

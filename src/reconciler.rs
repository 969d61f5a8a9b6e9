//! One-shot reconciliation pass.

use chrono::{DateTime, Duration, Utc};

use crate::config::Config;
use crate::error::Result;
use crate::godaddy::GoDaddyClient;
use crate::interval::min_update_interval;
use crate::resolver::PublicIpResolver;
use crate::state::{LastIpFile, LastState};

/// What a reconciliation pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Records were pushed and the state file now holds `ip`.
    Updated { ip: String, records: usize },
    /// Nothing to do; the provider was not contacted.
    Skipped,
}

/// Drives a single load, resolve, decide, update, persist pass.
///
/// The pass moves through immutable stage contexts: [`Loaded`] after the
/// state read, [`Resolved`] once the public IP is known. Each stage consumes
/// the previous one, so nothing is shared or mutated across steps.
pub struct Reconciler {
    config: Config,
    store: LastIpFile,
    resolver: PublicIpResolver,
    client: GoDaddyClient,
}

/// Context after the persisted state has been read.
struct Loaded {
    now: DateTime<Utc>,
    last: Option<LastState>,
}

/// Context once the current public IP is known; everything the decision
/// rule needs.
struct Resolved {
    now: DateTime<Utc>,
    last: Option<LastState>,
    current_ip: String,
}

impl Reconciler {
    /// Build a reconciler and its components from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let store = LastIpFile::new(config.last_ip_path());
        let resolver = match &config.ip_service {
            Some(url) => PublicIpResolver::with_url(url.clone()),
            None => PublicIpResolver::new(),
        };
        let client = GoDaddyClient::new(
            config.domain.clone(),
            config.api_key.clone(),
            config.secret.clone(),
        );
        Self::with_components(config, store, resolver, client)
    }

    /// Assemble from pre-built components (for testing).
    pub fn with_components(
        config: Config,
        store: LastIpFile,
        resolver: PublicIpResolver,
        client: GoDaddyClient,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            resolver,
            client,
        })
    }

    /// Run one pass.
    ///
    /// State is persisted only after the provider accepted the update, so
    /// a failed pass leaves the previous state intact and the next run
    /// retries in full.
    pub async fn run(&self) -> Result<Outcome> {
        let loaded = self.load_state()?;
        let resolved = self.resolve_ip(loaded).await?;
        self.apply(resolved).await
    }

    fn load_state(&self) -> Result<Loaded> {
        // `now` is captured once here; the decision rule and the persisted
        // timestamp both use this same instant.
        Ok(Loaded {
            now: Utc::now(),
            last: self.store.load()?,
        })
    }

    async fn resolve_ip(&self, loaded: Loaded) -> Result<Resolved> {
        let Loaded { now, last } = loaded;
        let current_ip = self.resolver.resolve().await?;
        Ok(Resolved {
            now,
            last,
            current_ip,
        })
    }

    async fn apply(&self, resolved: Resolved) -> Result<Outcome> {
        let Resolved {
            now,
            last,
            current_ip,
        } = resolved;

        let min_interval = min_update_interval(self.config.min_update_interval.as_deref());
        if should_skip(last.as_ref(), &current_ip, now, min_interval) {
            tracing::info!(ip = %current_ip, "ip unchanged, skipping update");
            return Ok(Outcome::Skipped);
        }

        let records = self.config.records.to_record_list(&current_ip);
        self.client.update(&records).await?;
        self.store.save(&current_ip, now)?;

        Ok(Outcome::Updated {
            ip: current_ip,
            records: records.len(),
        })
    }
}

/// Skip only when the IP is unchanged and the interval gate, when one is
/// configured, has not yet expired. An expired gate forces a re-apply of
/// the unchanged IP as a keep-alive.
fn should_skip(
    last: Option<&LastState>,
    current_ip: &str,
    now: DateTime<Utc>,
    min_interval: Duration,
) -> bool {
    let last = match last {
        Some(last) => last,
        None => return false,
    };
    if last.ip != current_ip {
        return false;
    }
    if min_interval.is_zero() {
        return true;
    }
    now.signed_duration_since(last.timestamp) < min_interval
}

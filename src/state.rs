//! Last-applied-IP persistence.

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// The most recently applied update: when it happened and which IP was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastState {
    pub timestamp: DateTime<Utc>,
    pub ip: String,
}

/// File-backed store for the last applied IP.
///
/// The whole state is a single line, `<epoch-millis>,<ip>`, replaced as a
/// unit on every save (temp file + rename), so a load after a successful
/// save always yields a consistent pair. The file is written only after the
/// provider has accepted an update; see the reconciler.
#[derive(Debug, Clone)]
pub struct LastIpFile {
    path: PathBuf,
}

impl LastIpFile {
    /// Create a store backed by `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the last applied state.
    ///
    /// A missing file is the expected first-run condition and yields
    /// `Ok(None)`. An existing file that cannot be read or parsed is an
    /// error.
    pub fn load(&self) -> Result<Option<LastState>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no state file at {}, first run", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let state = parse_state(content.trim()).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed state file {}", self.path.display()),
            )
        })?;
        Ok(Some(state))
    }

    /// Persist `(ip, timestamp)`, atomically replacing any previous state.
    pub fn save(&self, ip: &str, timestamp: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write-then-rename keeps a crash from leaving a half-written record.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, format!("{},{}\n", timestamp.timestamp_millis(), ip))?;
        std::fs::rename(&tmp, &self.path)?;

        tracing::debug!("persisted last ip {} to {}", ip, self.path.display());
        Ok(())
    }
}

fn parse_state(line: &str) -> Option<LastState> {
    let (millis, ip) = line.split_once(',')?;
    let timestamp = DateTime::from_timestamp_millis(millis.trim().parse().ok()?)?;
    let ip = ip.trim();
    if ip.is_empty() {
        return None;
    }
    Some(LastState {
        timestamp,
        ip: ip.to_string(),
    })
}

//! Configuration management for godaddy-ddns.

use crate::error::{DdnsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default record TTL in seconds. This is also the minimum GoDaddy accepts.
pub const DEFAULT_TTL: u32 = 600;

/// Main configuration structure.
///
/// Loaded once per run and owned immutably for the run's duration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Domain whose records are managed (e.g., "example.com").
    pub domain: String,

    /// GoDaddy API key.
    pub api_key: String,

    /// GoDaddy API secret.
    pub secret: String,

    /// Records to point at the resolved IP.
    pub records: Records,

    /// Minimum elapsed time before an unchanged IP is re-applied anyway,
    /// e.g. "10 MINUTES". Absent or unparsable means no interval gating.
    #[serde(default)]
    pub min_update_interval: Option<String>,

    /// IP echo service to query (default: api.ipify.org).
    #[serde(default)]
    pub ip_service: Option<String>,

    /// Where the last applied IP and its timestamp are persisted.
    #[serde(default)]
    pub last_ip_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DdnsError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Validate semantic invariants that deserialization cannot catch.
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() {
            return Err(DdnsError::Config("domain must not be empty".to_string()));
        }
        if self.api_key.is_empty() || self.secret.is_empty() {
            return Err(DdnsError::Config(
                "api_key and secret must not be empty".to_string(),
            ));
        }
        if self.records.is_empty() {
            return Err(DdnsError::Config("no records configured".to_string()));
        }
        for record in self.records.iter() {
            if record.name().is_empty() {
                return Err(DdnsError::Config(
                    "record name must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Path of the last-IP state file.
    pub fn last_ip_path(&self) -> PathBuf {
        self.last_ip_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("godaddy-ddns.lastip"))
    }
}

/// The `records` configuration value: a single bare name, a single record
/// table, or an array mixing both.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Records {
    One(RecordSpec),
    Many(Vec<RecordSpec>),
}

impl Records {
    /// Iterate the configured record specs in configuration order.
    pub fn iter(&self) -> std::slice::Iter<'_, RecordSpec> {
        match self {
            Records::One(spec) => std::slice::from_ref(spec).iter(),
            Records::Many(specs) => specs.iter(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::One(_) => 1,
            Records::Many(specs) => specs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize every spec into the wire records submitted to GoDaddy,
    /// with `data` set to `ip` on each.
    pub fn to_record_list(&self, ip: &str) -> Vec<DnsRecord> {
        self.iter().map(|spec| spec.normalize(ip)).collect()
    }
}

/// A single record as written in configuration: either a bare name with
/// everything defaulted, or a record with optional per-field overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordSpec {
    Name(String),
    Record {
        name: String,
        #[serde(rename = "type")]
        record_type: Option<String>,
        ttl: Option<u32>,
        /// Accepted for compatibility but never submitted: `data` is always
        /// replaced with the freshly resolved IP at update time.
        data: Option<String>,
    },
}

impl RecordSpec {
    /// The configured record name.
    pub fn name(&self) -> &str {
        match self {
            RecordSpec::Name(name) => name,
            RecordSpec::Record { name, .. } => name,
        }
    }

    /// The record type submitted to the provider ("A" unless overridden).
    pub fn record_type(&self) -> &str {
        match self {
            RecordSpec::Name(_) => "A",
            RecordSpec::Record { record_type, .. } => record_type.as_deref().unwrap_or("A"),
        }
    }

    /// The TTL submitted to the provider.
    pub fn ttl(&self) -> u32 {
        match self {
            RecordSpec::Name(_) => DEFAULT_TTL,
            RecordSpec::Record { ttl, .. } => ttl.unwrap_or(DEFAULT_TTL),
        }
    }

    /// Normalize to the wire record for `ip`.
    ///
    /// An explicit `ttl` below the 600-second provider minimum is submitted
    /// unchanged (GoDaddy enforces its own floor); it is logged so the
    /// operator can spot the likely rejection before the provider does.
    pub fn normalize(&self, ip: &str) -> DnsRecord {
        let ttl = self.ttl();
        if ttl < DEFAULT_TTL {
            tracing::warn!(
                "record {} has ttl {}s, below the provider minimum of {}s",
                self.name(),
                ttl,
                DEFAULT_TTL
            );
        }

        DnsRecord {
            name: self.name().to_string(),
            record_type: self.record_type().to_string(),
            data: ip.to_string(),
            ttl,
        }
    }
}

/// A fully normalized DNS record as submitted to the GoDaddy records API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub data: String,
    pub ttl: u32,
}

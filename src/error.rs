//! Error types for godaddy-ddns.

use thiserror::Error;

/// Result type alias for godaddy-ddns.
pub type Result<T> = std::result::Result<T, DdnsError>;

/// DDNS error types.
///
/// Every variant is fatal for the current run: nothing is retried, and the
/// last-IP state is never written once one of these surfaces.
#[derive(Error, Debug)]
pub enum DdnsError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network/HTTP transport error (IP resolution or GoDaddy API).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the GoDaddy API, carrying the `message`
    /// field of the error body when one was present.
    #[error("GoDaddy API error: {message}")]
    Provider { message: String },

    /// Last-IP state file read/write error.
    #[error("State file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DdnsError {
    fn from(e: reqwest::Error) -> Self {
        DdnsError::Network(e.to_string())
    }
}

impl From<toml::de::Error> for DdnsError {
    fn from(e: toml::de::Error) -> Self {
        DdnsError::Config(e.to_string())
    }
}

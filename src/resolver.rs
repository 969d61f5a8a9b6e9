//! Public IP resolution.

use crate::error::{DdnsError, Result};
use std::time::Duration;

const DEFAULT_IP_SERVICE: &str = "https://api.ipify.org";

/// Resolver for the caller's current public IPv4 address.
pub struct PublicIpResolver {
    client: reqwest::Client,
    url: String,
}

impl PublicIpResolver {
    /// Create a resolver against the default echo service.
    pub fn new() -> Self {
        Self::with_url(DEFAULT_IP_SERVICE.to_string())
    }

    /// Create a resolver against a custom echo service URL.
    pub fn with_url(url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, url }
    }

    /// Resolve the current public IP.
    ///
    /// A single request, no retries. The trimmed response body is returned
    /// as-is: it is not checked for IPv4 well-formedness, so the provider
    /// sees exactly what the echo service answered.
    pub async fn resolve(&self) -> Result<String> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(DdnsError::Network(format!(
                "HTTP {} from {}",
                response.status(),
                self.url
            )));
        }

        let ip = response.text().await?.trim().to_string();
        tracing::debug!("resolved public ip {} via {}", ip, self.url);
        Ok(ip)
    }
}

impl Default for PublicIpResolver {
    fn default() -> Self {
        Self::new()
    }
}

//! GoDaddy records API client.

use crate::config::DnsRecord;
use crate::error::{DdnsError, Result};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.godaddy.com";

/// Client for the GoDaddy v1 domains API, scoped to a single domain.
pub struct GoDaddyClient {
    client: reqwest::Client,
    domain: String,
    api_key: String,
    secret: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RecordData {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GoDaddyClient {
    /// Create a new client for `domain`.
    pub fn new(domain: String, api_key: String, secret: String) -> Self {
        Self::with_base_url(domain, api_key, secret, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(
        domain: String,
        api_key: String,
        secret: String,
        base_url: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            domain,
            api_key,
            secret,
            base_url,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    fn auth_header(&self) -> String {
        format!("sso-key {}:{}", self.api_key, self.secret)
    }

    /// Submit the normalized records in one bulk request.
    ///
    /// GoDaddy accepts or rejects the whole batch; there are no
    /// partial-success semantics. Returns the raw response body.
    pub async fn update(&self, records: &[DnsRecord]) -> Result<String> {
        let url = format!("{}/v1/domains/{}/records", self.base_url, self.domain);

        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.auth_header())
            .header("Content-Type", "application/json")
            .json(records)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            tracing::debug!("updated {} record(s) on {}", records.len(), self.domain);
            Ok(body)
        } else {
            Err(DdnsError::Provider {
                message: error_message(&body, status),
            })
        }
    }

    /// Fetch the current `data` value of one record, `None` when the record
    /// does not exist. Used for status reporting; the update pass itself
    /// never reads from the provider.
    pub async fn fetch_record_data(&self, record_type: &str, name: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/v1/domains/{}/records/{}/{}",
            self.base_url,
            self.domain,
            record_type,
            name.replace('@', "%40"),
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(DdnsError::Provider {
                message: error_message(&body, status),
            });
        }

        let records: Vec<RecordData> = response.json().await?;
        Ok(records.into_iter().next().map(|r| r.data))
    }
}

/// Best-effort extraction of the `message` field from an error body.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| format!("HTTP {}", status))
}

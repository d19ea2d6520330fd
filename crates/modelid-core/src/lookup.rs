//! Remote model metadata lookup by content digest.
//!
//! One outbound GET against the metadata service's
//! `/model-versions/by-hash/{digest}` endpoint. The response body is passed
//! through verbatim — including the service's own "not found" JSON — so
//! callers see exactly what the service reports. Responses are never
//! cached and failed lookups are never retried here.

use crate::config::NetworkConfig;
use crate::error::{ModelIdError, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the model metadata service.
pub struct CivitaiClient {
    client: Client,
    base_url: String,
}

impl CivitaiClient {
    /// Create a client against the default service endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(NetworkConfig::CIVITAI_API_BASE)
    }

    /// Create a client against a custom base URL (primarily for tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| ModelIdError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: Some(e.to_string()),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn by_hash_url(&self, digest: &str) -> String {
        format!("{}/model-versions/by-hash/{}", self.base_url, digest)
    }

    /// Look up model metadata for a content digest.
    ///
    /// Any JSON body the service returns is handed back as-is, regardless
    /// of HTTP status. Transport failures and the request timeout surface
    /// as `Network`/`Timeout`.
    pub async fn lookup_by_hash(&self, digest: &str) -> Result<Value> {
        let url = self.by_hash_url(digest);
        tracing::debug!(url = %url, "looking up model metadata");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelIdError::Timeout(NetworkConfig::REQUEST_TIMEOUT)
                } else {
                    ModelIdError::Network {
                        message: format!("GET {} failed: {}", url, e),
                        cause: Some(e.to_string()),
                    }
                }
            })?;

        let status = response.status();
        let payload: Value = response.json().await.map_err(|e| ModelIdError::Json {
            message: format!("Failed to parse metadata response ({}): {}", status, e),
            source: None,
        })?;

        Ok(payload)
    }
}

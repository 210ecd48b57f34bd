use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::types::ApiError;
use crate::config::ProbeConfig;
use crate::credential::Credential;

/// Default CLI version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string
fn build_user_agent() -> String {
    format!("keyprobe/{}", DEFAULT_VERSION)
}

/// API client for the OpenAI HTTP API.
///
/// Holds the credential for the lifetime of the run so every probe shares one
/// connection pool.
pub struct ApiClient {
    pub(super) client: Client,
    pub(super) base_url: Url,
    pub(super) user_agent: String,
    api_key: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ProbeConfig, credential: &Credential) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            user_agent: build_user_agent(),
            api_key: credential.expose().to_string(),
        })
    }

    pub(super) fn build_url(base_url: &Url, endpoint: &str) -> Result<Url> {
        base_url
            .join(endpoint)
            .with_context(|| format!("Failed to build URL for endpoint: {}", endpoint))
    }

    /// Send a request and decode the JSON response.
    ///
    /// Non-2xx responses become an [`ApiError`] inside the returned error so
    /// callers can classify them with `downcast_ref`.
    pub(super) async fn call_api<T, R>(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&T>,
    ) -> Result<R>
    where
        T: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let url = Self::build_url(&self.base_url, endpoint)?;
        let request_id = Uuid::new_v4().to_string();

        debug!("=== API Request ===");
        debug!("{} {}", method, url);
        debug!("Request ID: {}", request_id);

        let mut request = self
            .client
            .request(method, url.clone())
            .header("User-Agent", &self.user_agent)
            .header("X-Client-Request-Id", &request_id)
            .bearer_auth(&self.api_key);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        debug!("=== API Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let api_error = ApiError::from_http_response(status.as_u16(), &error_text);
            debug!(
                error_type = ?api_error.error_type,
                code = ?api_error.code,
                "Classified as {:?}",
                api_error.status
            );

            // Callers decide whether this is fatal
            debug!("API request to {} failed: {}", endpoint, api_error.message);

            anyhow::bail!(api_error);
        }

        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;
        serde_json::from_str(&response_text)
            .with_context(|| format!("Failed to parse response from {}", endpoint))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(key: &str) -> ApiClient {
        let config = ProbeConfig::default();
        let credential = Credential::from_argument(key).unwrap();
        ApiClient::new(&config, &credential).unwrap()
    }

    #[test]
    fn test_build_user_agent() {
        let ua = build_user_agent();
        assert!(ua.starts_with("keyprobe/"));
    }

    #[test]
    fn test_build_url_endpoints() {
        let base = Url::parse("https://api.openai.com/v1/").unwrap();
        let url = ApiClient::build_url(&base, "chat/completions").unwrap();
        assert_eq!(url.as_str(), "https://api.openai.com/v1/chat/completions");

        let url = ApiClient::build_url(&base, "models").unwrap();
        assert_eq!(url.as_str(), "https://api.openai.com/v1/models");
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = test_client("sk-secret-key-123456");
        let debug_str = format!("{:?}", client);
        assert!(!debug_str.contains("sk-secret-key-123456"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}

//! Runtime configuration read from environment variables.

use thiserror::Error;
use tracing::debug;
use url::Url;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

pub const BASELINE_MODEL_ENV: &str = "KEYPROBE_BASELINE_MODEL";
pub const ADVANCED_MODEL_ENV: &str = "KEYPROBE_ADVANCED_MODEL";
pub const TIMEOUT_ENV: &str = "KEYPROBE_TIMEOUT_SECS";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_BASELINE_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ADVANCED_MODEL: &str = "gpt-4";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_BASE_URL is not a valid URL: {value}")]
    InvalidBaseUrl { value: String },

    #[error("KEYPROBE_TIMEOUT_SECS must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { value: String },
}

/// Settings shared by every probe
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Base URL, always ending in `/` so endpoints join beneath it
    pub base_url: Url,
    /// Model used by the completion probe
    pub baseline_model: String,
    /// Model used by the conditional advanced-model probe
    pub advanced_model: String,
    /// Whole-request timeout
    pub timeout_secs: u64,
}

impl ProbeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = match get(BASE_URL_ENV) {
            Some(raw) => parse_base_url(&raw)?,
            None => parse_base_url(DEFAULT_BASE_URL)?,
        };
        let timeout_secs = match get(TIMEOUT_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::InvalidTimeout { value: raw }),
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            base_url,
            baseline_model: get(BASELINE_MODEL_ENV)
                .unwrap_or_else(|| DEFAULT_BASELINE_MODEL.to_string()),
            advanced_model: get(ADVANCED_MODEL_ENV)
                .unwrap_or_else(|| DEFAULT_ADVANCED_MODEL.to_string()),
            timeout_secs,
        };

        debug!(
            base_url = %config.base_url,
            baseline = %config.baseline_model,
            advanced = %config.advanced_model,
            timeout_secs = config.timeout_secs,
            "Loaded probe configuration"
        );

        Ok(config)
    }
}

/// Parse a base URL and make sure it ends with a slash.
///
/// `Url::join` replaces the last path segment otherwise, turning
/// `https://host/v1` + `models` into `https://host/models`.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    let url = Url::parse(&normalized).map_err(|_| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
    })?;

    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
        });
    }

    Ok(url)
}

#[cfg(test)]
impl Default for ProbeConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ProbeConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.baseline_model, "gpt-3.5-turbo");
        assert_eq!(config.advanced_model, "gpt-4");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_default_base_url_joins_endpoints() {
        let config = ProbeConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(
            config.base_url.join("models").unwrap().as_str(),
            "https://api.openai.com/v1/models"
        );
    }

    #[test]
    fn test_overrides() {
        let config = ProbeConfig::from_lookup(lookup_from(&[
            (BASE_URL_ENV, "http://localhost:8080/v1"),
            (BASELINE_MODEL_ENV, "gpt-4o-mini"),
            (ADVANCED_MODEL_ENV, "gpt-4o"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url.as_str(), "http://localhost:8080/v1/");
        assert_eq!(config.baseline_model, "gpt-4o-mini");
        assert_eq!(config.advanced_model, "gpt-4o");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config =
            ProbeConfig::from_lookup(lookup_from(&[(BASELINE_MODEL_ENV, "  "), (TIMEOUT_ENV, "")]))
                .unwrap();
        assert_eq!(config.baseline_model, DEFAULT_BASELINE_MODEL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_values() {
        let err = ProbeConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));

        let err = ProbeConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { .. }));

        let err =
            ProbeConfig::from_lookup(lookup_from(&[(BASE_URL_ENV, "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

        let err = ProbeConfig::from_lookup(lookup_from(&[(BASE_URL_ENV, "ftp://example.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}

//! API key resolution.
//!
//! The key comes from `OPENAI_API_KEY` (which a `.env` file may populate) and
//! falls back to the first positional argument.

use std::path::PathBuf;

use tracing::debug;

use crate::config::API_KEY_ENV;
use crate::error::ProbeError;

/// Keys this short are never partially displayed
const MIN_MASKABLE_LEN: usize = 13;

/// Where the key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Argument,
}

/// A non-empty API key.
#[derive(Clone)]
pub struct Credential {
    value: String,
    source: CredentialSource,
}

impl Credential {
    fn new(value: &str, source: CredentialSource) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        Some(Self {
            value: value.to_string(),
            source,
        })
    }

    /// Build a credential from a command-line value.
    pub fn from_argument(value: &str) -> Option<Self> {
        Self::new(value, CredentialSource::Argument)
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// The raw key, for the Authorization header only.
    pub fn expose(&self) -> &str {
        &self.value
    }

    /// Masked form safe to print: `sk-proj-...wxyz`.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.value.chars().collect();
        if chars.len() < MIN_MASKABLE_LEN {
            return "***".to_string();
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

/// Load a `.env` file from the current directory or its parents.
///
/// Variables already set in the process environment win. Runs before logging
/// is initialised, so the caller reports the result.
pub fn load_env_file() -> Result<PathBuf, dotenvy::Error> {
    dotenvy::dotenv()
}

/// Pick the key: environment first, then the argument.
pub fn resolve(env_value: Option<&str>, arg_value: Option<&str>) -> Result<Credential, ProbeError> {
    if let Some(credential) = env_value.and_then(|v| Credential::new(v, CredentialSource::Environment))
    {
        debug!("Using API key from {}", API_KEY_ENV);
        return Ok(credential);
    }

    if let Some(credential) = arg_value.and_then(Credential::from_argument) {
        debug!("Using API key from command line argument");
        return Ok(credential);
    }

    Err(ProbeError::MissingCredential)
}

/// Resolve with the environment read through `lookup`.
pub fn resolve_with<F>(lookup: F, arg_value: Option<&str>) -> Result<Credential, ProbeError>
where
    F: Fn(&str) -> Option<String>,
{
    let env_value = lookup(API_KEY_ENV);
    resolve(env_value.as_deref(), arg_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_wins() {
        let credential = resolve(Some("sk-from-env-1234567"), Some("sk-from-arg-1234567")).unwrap();
        assert_eq!(credential.expose(), "sk-from-env-1234567");
        assert_eq!(credential.source(), CredentialSource::Environment);
    }

    #[test]
    fn test_argument_fallback() {
        let credential = resolve(None, Some("sk-from-arg-1234567")).unwrap();
        assert_eq!(credential.expose(), "sk-from-arg-1234567");
        assert_eq!(credential.source(), CredentialSource::Argument);

        // Blank environment value counts as unset
        let credential = resolve(Some("   "), Some("sk-from-arg-1234567")).unwrap();
        assert_eq!(credential.source(), CredentialSource::Argument);
    }

    #[test]
    fn test_missing_credential() {
        assert!(matches!(resolve(None, None), Err(ProbeError::MissingCredential)));
        assert!(matches!(resolve(Some(""), Some("")), Err(ProbeError::MissingCredential)));
    }

    #[test]
    fn test_resolve_with_lookup() {
        let lookup = |key: &str| (key == API_KEY_ENV).then(|| "sk-looked-up-12345".to_string());
        let credential = resolve_with(lookup, Some("sk-from-arg-1234567")).unwrap();
        assert_eq!(credential.expose(), "sk-looked-up-12345");

        let credential = resolve_with(|_| None, Some("sk-from-arg-1234567")).unwrap();
        assert_eq!(credential.source(), CredentialSource::Argument);
    }

    #[test]
    fn test_masked() {
        let credential = Credential::from_argument("sk-proj-abcdefghijklmnop").unwrap();
        assert_eq!(credential.masked(), "sk-proj-...mnop");

        let short = Credential::from_argument("sk-short").unwrap();
        assert_eq!(short.masked(), "***");

        let boundary = Credential::from_argument("abcdefghijkl").unwrap();
        assert_eq!(boundary.masked(), "***");
    }

    #[test]
    fn test_masked_multibyte() {
        let credential = Credential::from_argument("ключ-ключ-ключ-ключ").unwrap();
        assert_eq!(credential.masked(), "ключ-клю...ключ");
    }

    #[test]
    fn test_debug_redacts_key() {
        let credential = Credential::from_argument("sk-secret-token-123").unwrap();
        let debug_str = format!("{:?}", credential);
        assert!(!debug_str.contains("sk-secret-token-123"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}

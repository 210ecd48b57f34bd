//! Fatal errors that end a probe run with exit code 1.
//!
//! Non-fatal probe failures are not errors here; they come back as
//! [`crate::probe::ProbeOutcome::Failure`] values.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Neither the environment nor the argument supplied a key
    #[error("OPENAI_API_KEY environment variable not found and no key argument given")]
    MissingCredential,

    /// The completion probe was rejected, so the key itself is unusable
    #[error("Error testing OpenAI API: {message}")]
    CredentialInvalid {
        message: String,
        /// Classified API error when the service answered at all
        api_error: Option<ApiError>,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be constructed
    #[error("Failed to initialize API client: {0:#}")]
    Client(anyhow::Error),
}

impl ProbeError {
    /// Build `CredentialInvalid` from a completion failure, keeping the
    /// typed API error when there is one.
    pub fn credential_invalid(err: &anyhow::Error) -> Self {
        ProbeError::CredentialInvalid {
            message: format!("{:#}", err),
            api_error: err.downcast_ref::<ApiError>().cloned(),
        }
    }

    /// Status-specific hint for the failure banner
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ProbeError::CredentialInvalid {
                api_error: Some(api_error),
                ..
            } => Some(api_error.user_hint()),
            _ => None,
        }
    }
}

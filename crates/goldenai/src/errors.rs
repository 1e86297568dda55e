use thiserror::Error;

use crate::providers::base::TransportError;

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Unsupported content kind: {0}")]
    UnsupportedContentKind(String),

    #[error("Request for {0} has no messages to send")]
    EmptyConversation(String),

    #[error("Unknown pricing for model: {0}")]
    UnknownPricing(String),

    #[error("Missing credential: {env_var} is not set")]
    MissingCredential { env_var: String },

    #[error("Failed to load document {path}: {source}")]
    Document {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// Transport failures keep the provider's status and body untouched.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    pub(crate) fn invalid_response(provider: impl ToString, message: impl Into<String>) -> Self {
        LlmError::InvalidResponse {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_passes_through() {
        let err: LlmError = TransportError::Api {
            status: 429,
            body: "rate_limit_error".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "API error (status 429): rate_limit_error"
        );
        assert!(matches!(
            err,
            LlmError::Transport(TransportError::Api { status: 429, .. })
        ));
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = LlmError::MissingCredential {
            env_var: "OPENAI_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}

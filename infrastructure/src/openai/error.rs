//! Error types for the OpenAI-compatible adapter

use roundtable_application::GatewayError;
use thiserror::Error;

/// Result type alias for OpenAI-compatible backend operations
pub type Result<T> = std::result::Result<T, OpenAiError>;

/// Errors that can occur when talking to an OpenAI-compatible backend
#[derive(Error, Debug)]
pub enum OpenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response contained no choices")]
    EmptyChoices,

    #[error("No API key configured")]
    MissingApiKey,
}

impl From<OpenAiError> for GatewayError {
    fn from(err: OpenAiError) -> Self {
        match err {
            OpenAiError::Http(e) if e.is_timeout() => GatewayError::Timeout,
            OpenAiError::Http(e) if e.is_connect() => GatewayError::ConnectionError(e.to_string()),
            OpenAiError::Http(e) => GatewayError::RequestFailed(e.to_string()),
            OpenAiError::Status {
                status: 404,
                message,
            } => GatewayError::ModelNotAvailable(message),
            e @ OpenAiError::Status { .. } => GatewayError::RequestFailed(e.to_string()),
            e @ (OpenAiError::Parse(_) | OpenAiError::EmptyChoices) => {
                GatewayError::MalformedResponse(e.to_string())
            }
            e @ OpenAiError::MissingApiKey => GatewayError::Other(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = OpenAiError::Status {
            status: 404,
            message: "model `nope` does not exist".to_string(),
        };
        assert_eq!(
            GatewayError::from(not_found),
            GatewayError::ModelNotAvailable("model `nope` does not exist".to_string())
        );

        let throttled = OpenAiError::Status {
            status: 429,
            message: "slow down".to_string(),
        };
        assert_eq!(
            GatewayError::from(throttled),
            GatewayError::RequestFailed("Backend returned 429: slow down".to_string())
        );
    }

    #[test]
    fn test_malformed_mapping() {
        assert!(matches!(
            GatewayError::from(OpenAiError::EmptyChoices),
            GatewayError::MalformedResponse(_)
        ));
    }
}

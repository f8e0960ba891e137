/*
[INPUT]:  Error sources (HTTP, API, serialization, configuration)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Dynagent adapter
#[derive(Error, Debug)]
pub enum DynagentError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DynagentError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            DynagentError::Http(_) | DynagentError::InvalidResponse(_) => true,
            DynagentError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if the error is a client-side request problem (4xx)
    pub fn is_client_error(&self) -> bool {
        matches!(self, DynagentError::Api { status, .. } if (400..500).contains(status))
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        DynagentError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for Dynagent operations
pub type Result<T> = std::result::Result<T, DynagentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let server_err = DynagentError::api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(server_err.is_retryable());

        let validation_err =
            DynagentError::api_error(StatusCode::BAD_REQUEST, "Only PDF files are supported");
        assert!(!validation_err.is_retryable());
        assert!(validation_err.is_client_error());
    }

    #[test]
    fn test_api_error_creation() {
        let err =
            DynagentError::api_error(StatusCode::PAYLOAD_TOO_LARGE, "File size exceeds maximum");
        match err {
            DynagentError::Api { status, message } => {
                assert_eq!(status, 413);
                assert_eq!(message, "File size exceeds maximum");
            }
            _ => panic!("Expected Api error variant"),
        }
    }
}

// crates/network/src/error.rs
//! Error types for backend requests

use std::time::Duration;
use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur while talking to the backend
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Transport-level failure (connection refused, DNS, reset)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error (session file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not complete in time
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP 401
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        /// The backend said the bearer token is invalid or expired
        token_invalid: bool,
    },

    /// An authenticated endpoint was called with no stored session
    #[error("Not signed in")]
    NotAuthenticated,

    /// HTTP 404
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Any other HTTP 4xx
    #[error("Request rejected ({status}): {message}")]
    Validation { status: u16, message: String },

    /// HTTP 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not match any known shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl NetworkError {
    /// Returns true if the error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NetworkError::Timeout(_) | NetworkError::Http(_) | NetworkError::Server { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NetworkError::InvalidUrl("test".to_string());
        assert!(err.to_string().contains("Invalid URL"));

        let err = NetworkError::Validation {
            status: 422,
            message: "livroId obrigatório".to_string(),
        };
        assert_eq!(err.to_string(), "Request rejected (422): livroId obrigatório");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(NetworkError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(NetworkError::Server {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!NetworkError::InvalidUrl("test".to_string()).is_retryable());
        assert!(!NetworkError::NotFound {
            resource: "/livros/1".to_string()
        }
        .is_retryable());
        assert!(!NetworkError::Unauthorized {
            message: "Token inválido".to_string(),
            token_invalid: true,
        }
        .is_retryable());
    }
}

// crates/sync-engine/src/error.rs
//! Error types for favorite and reading-status mutations

use museu_network::NetworkError;
use std::time::Duration;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// How a failure should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request did not complete; the reader may simply try again
    Network,
    /// Session invalid; the reader has to sign in again
    Auth,
    /// Rejected by the server or by local checks; shown next to the control
    Validation,
    /// The book or author does not exist
    NotFound,
    /// Client-side fault (poisoned lock)
    Internal,
}

/// Errors surfaced by the sync engine
#[derive(Debug, Clone, Error)]
pub enum SyncError {
    /// Transport failure or server error
    #[error("Network error: {0}")]
    Network(String),

    /// No answer within the mutation timeout
    #[error("No response from the server after {0:?}")]
    Timeout(Duration),

    /// Session missing, invalid or expired
    #[error("Please sign in again: {0}")]
    Auth(String),

    /// Rejected input
    #[error("{0}")]
    Validation(String),

    /// Unknown entity
    #[error("Not found: {0}")]
    NotFound(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Network(_) | SyncError::Timeout(_) => ErrorKind::Network,
            SyncError::Auth(_) => ErrorKind::Auth,
            SyncError::Validation(_) => ErrorKind::Validation,
            SyncError::NotFound(_) => ErrorKind::NotFound,
            SyncError::Custom(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn lock_poisoned() -> Self {
        SyncError::Custom("Lock poisoned".to_string())
    }
}

impl From<NetworkError> for SyncError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Timeout(limit) => SyncError::Timeout(limit),
            NetworkError::Unauthorized { message, .. } => SyncError::Auth(message),
            NetworkError::NotAuthenticated => SyncError::Auth("not signed in".to_string()),
            NetworkError::Validation { message, .. } => SyncError::Validation(message),
            NetworkError::NotFound { resource } => SyncError::NotFound(resource),
            other => SyncError::Network(other.to_string()),
        }
    }
}

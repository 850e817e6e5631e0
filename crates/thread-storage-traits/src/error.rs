//! Error types for thread storage operations

use thiserror::Error;

/// Error type for thread storage operations.
///
/// Every storage trait in this crate, and the transaction closure passed to
/// [`crate::ThreadStorageProvider::transaction`], reports failures with this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThreadStorageError {
    /// Database operation failed
    #[error("database error: {0}")]
    Database(String),

    /// Serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Requested item was not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl From<serde_json::Error> for ThreadStorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

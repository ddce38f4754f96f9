//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// A missing document is not an error: `read` returns `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never reached the store, or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a non-success status.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body could not be understood.
    #[error("decode error: {0}")]
    Decode(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A path returned by the store or built by the caller is invalid.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] treeshift_types::Error),

    /// A delete batch holds more paths than one commit accepts. Nothing was sent.
    #[error("batch of {size} deletes exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    /// The store refused the call without applying it.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

//! Error types for presence tracking.

use thiserror::Error;

/// Result type for presence operations.
pub type PresenceResult<T> = Result<T, PresenceError>;

/// Errors that can occur while reading or writing presence.
#[derive(Debug, Error)]
pub enum PresenceError {
    /// The underlying store call failed.
    #[error("store error: {0}")]
    Store(#[from] treeshift_store::StoreError),

    /// The uid or collection cannot be used as a path.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] treeshift_types::Error),
}

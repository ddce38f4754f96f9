//! Error types for the tree engine.

use thiserror::Error;
use treeshift_store::StoreError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors returned by engine operations. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A collection-wide delete was aimed outside the allowed root.
    /// Raised before any store call is made.
    #[error("refusing to delete {collection}: path does not start with {allowed_prefix:?}")]
    GuardViolation {
        collection: String,
        allowed_prefix: String,
    },

    /// A root guard was built with an unusable prefix.
    #[error("invalid root guard: {0}")]
    InvalidGuard(String),

    /// A store call failed. Work done before it is not rolled back.
    #[error("{operation} {path} failed: {source}")]
    Store {
        operation: &'static str,
        path: String,
        #[source]
        source: StoreError,
    },

    /// A path could not be built from a subcollection name or document id.
    #[error("invalid path: {0}")]
    InvalidPath(#[from] treeshift_types::Error),
}

impl EngineError {
    pub(crate) fn store(operation: &'static str, path: impl ToString, source: StoreError) -> Self {
        Self::Store {
            operation,
            path: path.to_string(),
            source,
        }
    }

    /// Returns true if this is a guard violation.
    #[must_use]
    pub fn is_guard_violation(&self) -> bool {
        matches!(self, Self::GuardViolation { .. })
    }
}

//! Error types for sign-in and registration.

use thiserror::Error;

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Errors that can occur while signing in or registering a member.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("nonce length must be positive")]
    InvalidNonceLength,

    #[error("network error: {0}")]
    Network(String),

    /// The identity service answered with a non-success status.
    #[error("identity service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("store error: {0}")]
    Store(#[from] treeshift_store::StoreError),

    #[error("invalid path: {0}")]
    InvalidPath(#[from] treeshift_types::Error),
}

impl From<reqwest::Error> for IdentityError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

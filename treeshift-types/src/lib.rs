//! Core type definitions for treeshift.
//!
//! This crate defines the plain data shared by the store clients, the tree
//! engine and its collaborators:
//! - Collection and document paths (validated, slash-separated)
//! - Field values and documents
//! - Pages, page queries and page sizes
//! - Caller-declared subcollection lists
//! - An injectable clock
//!
//! Nothing here performs I/O.

mod clock;
mod document;
mod path;
mod subcollections;
mod value;

pub use clock::{Clock, FixedClock, SystemClock};
pub use document::{Document, Page, PageQuery, PageSize, ReadSource, DEFAULT_PAGE_SIZE};
pub use path::{CollectionPath, DocumentPath};
pub use subcollections::SubcollectionSpec;
pub use value::{FieldValue, Fields};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when building the core types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid page size: {0}")]
    InvalidPageSize(u32),

    #[error("invalid subcollection name {name:?}: {reason}")]
    InvalidSubcollection { name: String, reason: String },
}

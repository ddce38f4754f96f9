//! Document store clients for treeshift.
//!
//! Provides the [`DocumentStore`] capability the tree engine is written
//! against, and two implementations of it:
//! - [`FirestoreStore`] talks to the Firestore REST API (or its emulator)
//! - [`MemoryStore`] keeps documents in process, records every call and can
//!   inject failures, for deterministic tests
//!
//! Both implementations share the same paging and batch semantics: list
//! queries return direct children of a collection ordered by document id,
//! and a delete batch is applied all-or-nothing.

mod error;
pub mod firestore;
pub mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use firestore::{FirestoreConfig, FirestoreStore, MAX_BATCH_WRITES};
pub use memory::{FailureRule, MemoryStore, StoreCall, StoreOp};
pub use store::DocumentStore;

//! Tree copy and guarded recursive delete engine.
//!
//! Works against any [`DocumentStore`](treeshift_store::DocumentStore):
//!
//! - **Copy**: a document's fields plus every document of each named
//!   subcollection, or a whole collection of such trees.
//! - **Wipe**: one server-read page of a collection deleted as one atomic
//!   batch.
//! - **Delete**: a document after all of its named subcollections are empty,
//!   or every document tree in a collection once the collection path passes
//!   a [`RootGuard`].
//!
//! Subcollection names always come from the caller; the engine never asks
//! the store which subcollections exist, and it descends exactly one level.
//!
//! Every remote call is awaited before the next is issued. A failure stops
//! the operation where it happened and is returned; everything done before
//! it stays done, and running the same operation again converges.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use treeshift_engine::{RootGuard, TreeEngine};
//! use treeshift_store::MemoryStore;
//! use treeshift_types::{CollectionPath, PageSize, SubcollectionSpec};
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let engine = TreeEngine::new(Arc::new(MemoryStore::new()));
//! let clubs = CollectionPath::parse("fakeClubs").unwrap();
//! let subs = SubcollectionSpec::new(["roles", "members"]).unwrap();
//! let guard = RootGuard::new("fakeClubs").unwrap();
//!
//! engine
//!     .delete_collection(&clubs, &subs, PageSize::default(), &guard)
//!     .await
//!     .unwrap();
//! # });
//! ```

mod config;
mod copy;
mod delete;
mod engine;
mod error;
mod guard;
mod report;

pub use config::EngineConfig;
pub use engine::TreeEngine;
pub use error::{EngineError, EngineResult};
pub use guard::RootGuard;
pub use report::{CopyReport, DeleteReport};

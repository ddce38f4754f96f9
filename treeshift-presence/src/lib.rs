//! Member presence tracking.
//!
//! A member's presence lives in one document, `{collection}/{uid}`, holding
//! the member's state and when it was last seen. Whether a member counts as
//! online is decided at read time by a [`PresencePolicy`], never stored.
//!
//! - [`PresenceManager`] writes the local member's presence
//! - [`PresenceObserver`] reads other members' presence
//! - [`PresenceStore`] is the seam between them and storage;
//!   [`DocumentPresenceStore`] implements it over any
//!   [`DocumentStore`](treeshift_store::DocumentStore)
//!
//! Write failures are returned to the caller (and logged); nothing here
//! retries in the background.

mod error;
mod manager;
mod model;
mod observer;
mod store;

pub use error::{PresenceError, PresenceResult};
pub use manager::PresenceManager;
pub use model::{PresencePolicy, PresenceSnapshot, PresenceState, PresenceUpdate};
pub use observer::PresenceObserver;
pub use store::{DocumentPresenceStore, PresenceConfig, PresenceStore};

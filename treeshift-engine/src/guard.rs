//! Root guard for collection-wide deletes.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use tracing::warn;
use treeshift_types::CollectionPath;

/// An allowed path prefix. A collection-wide delete only runs when the
/// collection's path starts with it.
///
/// The comparison is textual: `fakeClubs` also admits `fakeClubsArchive`.
/// There is no default; every caller names the root it is willing to lose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootGuard {
    allowed_prefix: String,
}

impl RootGuard {
    /// Creates a guard. An empty prefix would admit every path and is rejected.
    pub fn new(allowed_prefix: impl Into<String>) -> EngineResult<Self> {
        let allowed_prefix = allowed_prefix.into();
        if allowed_prefix.trim().is_empty() {
            return Err(EngineError::InvalidGuard(
                "allowed prefix must not be empty".to_string(),
            ));
        }
        Ok(Self { allowed_prefix })
    }

    #[must_use]
    pub fn allowed_prefix(&self) -> &str {
        &self.allowed_prefix
    }

    /// Returns true if `collection` is inside the allowed root.
    #[must_use]
    pub fn permits(&self, collection: &CollectionPath) -> bool {
        collection.starts_with(&self.allowed_prefix)
    }

    /// Fails with [`EngineError::GuardViolation`] unless `collection` is permitted.
    pub fn check(&self, collection: &CollectionPath) -> EngineResult<()> {
        if self.permits(collection) {
            return Ok(());
        }

        warn!(
            "Refusing to wipe {}: outside allowed root {:?}",
            collection, self.allowed_prefix
        );
        Err(EngineError::GuardViolation {
            collection: collection.to_string(),
            allowed_prefix: self.allowed_prefix.clone(),
        })
    }
}

impl TryFrom<String> for RootGuard {
    type Error = EngineError;

    fn try_from(value: String) -> EngineResult<Self> {
        Self::new(value)
    }
}

impl From<RootGuard> for String {
    fn from(guard: RootGuard) -> Self {
        guard.allowed_prefix
    }
}

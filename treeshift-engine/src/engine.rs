//! The tree engine service object.

use crate::config::EngineConfig;
use std::sync::Arc;
use treeshift_store::DocumentStore;

/// Copies and deletes document trees in one store.
///
/// Holds no state between calls besides the store handle and its config,
/// so one engine can serve any number of sequential or concurrent calls.
/// Concurrent calls on overlapping paths are not serialized.
pub struct TreeEngine {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) config: EngineConfig,
}

impl TreeEngine {
    /// Creates an engine with the default config.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn DocumentStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the store this engine works on.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}

//! Reads other members' presence.

use crate::error::PresenceResult;
use crate::model::{PresencePolicy, PresenceSnapshot};
use crate::store::PresenceStore;
use std::sync::Arc;
use treeshift_types::Clock;

/// Read-only view of presence, evaluated against the injected clock.
pub struct PresenceObserver {
    store: Arc<dyn PresenceStore>,
    clock: Arc<dyn Clock>,
}

impl PresenceObserver {
    pub fn new(store: Arc<dyn PresenceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn member_presence(&self, uid: &str) -> PresenceResult<Option<PresenceSnapshot>> {
        self.store.fetch_member(uid).await
    }

    /// Whether `uid` is online right now. Members never seen are offline.
    pub async fn is_member_online(&self, uid: &str, policy: &PresencePolicy) -> PresenceResult<bool> {
        let now = self.clock.now();
        Ok(self
            .store
            .fetch_member(uid)
            .await?
            .is_some_and(|s| s.is_online(policy, now)))
    }

    pub async fn online_users(&self, policy: &PresencePolicy) -> PresenceResult<Vec<PresenceSnapshot>> {
        self.store.fetch_online_users(policy, self.clock.now()).await
    }
}

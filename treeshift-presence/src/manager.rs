//! Writes the local member's presence.

use crate::error::PresenceResult;
use crate::model::{PresenceState, PresenceUpdate};
use crate::store::PresenceStore;
use std::sync::Arc;
use tracing::{info, warn};
use treeshift_types::Clock;

/// Publishes presence transitions for the signed-in member.
///
/// Every call stamps `lastSeen` from the injected clock. Failures are logged
/// and returned; the manager keeps no state of its own, so a failed call can
/// simply be repeated.
pub struct PresenceManager {
    store: Arc<dyn PresenceStore>,
    clock: Arc<dyn Clock>,
}

impl PresenceManager {
    pub fn new(store: Arc<dyn PresenceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Marks the member online and records which device and build they use.
    pub async fn start_tracking(
        &self,
        uid: &str,
        device_id: Option<&str>,
        app_version: Option<&str>,
    ) -> PresenceResult<()> {
        let update = PresenceUpdate {
            state: PresenceState::Online,
            last_seen: self.clock.now(),
            device_id: device_id.map(str::to_string),
            app_version: app_version.map(str::to_string),
        };
        self.publish(uid, &update, "start tracking").await?;
        info!(uid, "Presence tracking started");
        Ok(())
    }

    pub async fn stop_tracking(&self, uid: &str) -> PresenceResult<()> {
        let now = self.clock.now();
        if let Err(e) = self.store.clear_presence(uid, now).await {
            warn!(uid, error = %e, "Failed to stop presence tracking");
            return Err(e);
        }
        info!(uid, "Presence tracking stopped");
        Ok(())
    }

    pub async fn mark_background(&self, uid: &str) -> PresenceResult<()> {
        let update = PresenceUpdate::new(PresenceState::Background, self.clock.now());
        self.publish(uid, &update, "mark background").await
    }

    pub async fn mark_foreground(&self, uid: &str) -> PresenceResult<()> {
        let update = PresenceUpdate::new(PresenceState::Online, self.clock.now());
        self.publish(uid, &update, "mark foreground").await
    }

    async fn publish(
        &self,
        uid: &str,
        update: &PresenceUpdate,
        action: &'static str,
    ) -> PresenceResult<()> {
        self.store.set_presence(uid, update).await.inspect_err(|e| {
            warn!(uid, action, error = %e, "Presence write failed");
        })
    }
}

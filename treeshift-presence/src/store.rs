//! Presence storage seam and its document-backed implementation.

use crate::error::PresenceResult;
use crate::model::{PresencePolicy, PresenceSnapshot, PresenceState, PresenceUpdate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use treeshift_store::DocumentStore;
use treeshift_types::{CollectionPath, DocumentPath, FieldValue, Fields, PageQuery, PageSize};

const FIELD_UID: &str = "uid";
const FIELD_STATE: &str = "state";
const FIELD_LAST_SEEN: &str = "lastSeen";
const FIELD_DEVICE_ID: &str = "deviceID";
const FIELD_APP_VERSION: &str = "appVersion";

fn default_collection() -> String {
    "onlineUsers".to_string()
}

/// Where presence documents live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// Root collection holding one document per member.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Page size used when scanning for online members.
    #[serde(default)]
    pub page_size: PageSize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            page_size: PageSize::default(),
        }
    }
}

/// Reads and writes presence records.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// One member's presence, or `None` if they never reported any.
    async fn fetch_member(&self, uid: &str) -> PresenceResult<Option<PresenceSnapshot>>;

    /// Every member currently online under `policy` at `now`.
    async fn fetch_online_users(
        &self,
        policy: &PresencePolicy,
        now: DateTime<Utc>,
    ) -> PresenceResult<Vec<PresenceSnapshot>>;

    /// Merges `update` into the member's record.
    async fn set_presence(&self, uid: &str, update: &PresenceUpdate) -> PresenceResult<()>;

    /// Marks the member offline as of `now`.
    async fn clear_presence(&self, uid: &str, now: DateTime<Utc>) -> PresenceResult<()>;
}

/// [`PresenceStore`] over a [`DocumentStore`], one document per member.
pub struct DocumentPresenceStore {
    store: Arc<dyn DocumentStore>,
    collection: CollectionPath,
    page_size: PageSize,
}

impl DocumentPresenceStore {
    /// Fails if `config.collection` is not a valid collection path.
    pub fn new(store: Arc<dyn DocumentStore>, config: &PresenceConfig) -> PresenceResult<Self> {
        Ok(Self {
            store,
            collection: CollectionPath::parse(&config.collection)?,
            page_size: config.page_size,
        })
    }

    #[must_use]
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    fn member_path(&self, uid: &str) -> PresenceResult<DocumentPath> {
        Ok(self.collection.doc(uid)?)
    }

    /// Read-modify-write so fields this update leaves unset survive.
    async fn merge(&self, uid: &str, update: &PresenceUpdate) -> PresenceResult<()> {
        let path = self.member_path(uid)?;
        let mut fields = self
            .store
            .read(&path)
            .await?
            .map(|doc| doc.fields)
            .unwrap_or_default();

        fields.insert(FIELD_UID.into(), FieldValue::from(uid));
        fields.insert(FIELD_STATE.into(), FieldValue::from(update.state.as_str()));
        fields.insert(FIELD_LAST_SEEN.into(), FieldValue::from(update.last_seen));
        if let Some(device_id) = &update.device_id {
            fields.insert(FIELD_DEVICE_ID.into(), FieldValue::from(device_id.as_str()));
        }
        if let Some(app_version) = &update.app_version {
            fields.insert(FIELD_APP_VERSION.into(), FieldValue::from(app_version.as_str()));
        }

        self.store.write(&path, &fields).await?;
        debug!(uid, state = %update.state, "Presence written");
        Ok(())
    }
}

/// Decodes a stored record. The document id wins when `uid` is missing.
fn snapshot(id: &str, fields: &Fields) -> PresenceSnapshot {
    let uid = fields
        .get(FIELD_UID)
        .and_then(FieldValue::as_str)
        .unwrap_or(id)
        .to_string();
    let state = fields
        .get(FIELD_STATE)
        .and_then(FieldValue::as_str)
        .and_then(|s| s.parse::<PresenceState>().ok())
        .unwrap_or_default();
    let last_seen = fields.get(FIELD_LAST_SEEN).and_then(FieldValue::as_timestamp);
    PresenceSnapshot {
        uid,
        state,
        last_seen,
    }
}

#[async_trait]
impl PresenceStore for DocumentPresenceStore {
    async fn fetch_member(&self, uid: &str) -> PresenceResult<Option<PresenceSnapshot>> {
        let path = self.member_path(uid)?;
        Ok(self
            .store
            .read(&path)
            .await?
            .map(|doc| snapshot(doc.id(), &doc.fields)))
    }

    async fn fetch_online_users(
        &self,
        policy: &PresencePolicy,
        now: DateTime<Utc>,
    ) -> PresenceResult<Vec<PresenceSnapshot>> {
        let mut online = Vec::new();
        let mut query = PageQuery::first(self.page_size);

        loop {
            let page = self.store.list_page(&self.collection, &query).await?;
            online.extend(
                page.documents
                    .iter()
                    .map(|doc| snapshot(doc.id(), &doc.fields))
                    .filter(|s| s.state.is_active() && s.is_online(policy, now)),
            );
            match page.next_page_token {
                Some(token) => query = PageQuery::first(self.page_size).after(token),
                None => break,
            }
        }

        debug!(count = online.len(), "Fetched online members");
        Ok(online)
    }

    async fn set_presence(&self, uid: &str, update: &PresenceUpdate) -> PresenceResult<()> {
        self.merge(uid, update).await
    }

    async fn clear_presence(&self, uid: &str, now: DateTime<Utc>) -> PresenceResult<()> {
        self.merge(uid, &PresenceUpdate::new(PresenceState::Offline, now))
            .await
    }
}

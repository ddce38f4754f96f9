//! Session handling and member registration.

use crate::error::IdentityResult;
use crate::provider::{IdentityProvider, IdentityUser, SignInCredential};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use treeshift_store::DocumentStore;
use treeshift_types::{Clock, CollectionPath, DocumentPath, FieldValue, Fields};

fn default_collection() -> String {
    "registeredMembers".to_string()
}

/// Where member records live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for MemberConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
        }
    }
}

/// Caller-supplied data for a new member record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberProfile {
    pub gender: Option<String>,
    /// Written last, so these win over the standard fields.
    pub extra_fields: Fields,
}

/// Signs members in and keeps one member record per account.
pub struct AuthService {
    store: Arc<dyn DocumentStore>,
    provider: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
    members: CollectionPath,
    session: RwLock<Option<IdentityUser>>,
}

impl AuthService {
    /// Fails if `config.collection` is not a valid collection path.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        config: &MemberConfig,
    ) -> IdentityResult<Self> {
        Ok(Self {
            store,
            provider,
            clock,
            members: CollectionPath::parse(&config.collection)?,
            session: RwLock::new(None),
        })
    }

    pub async fn current_user(&self) -> Option<IdentityUser> {
        self.session.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Signs in and makes the account the current session.
    pub async fn sign_in(&self, credential: &SignInCredential) -> IdentityResult<IdentityUser> {
        let user = self.provider.sign_in(credential).await?;
        *self.session.write().await = Some(user.clone());
        info!(uid = %user.uid, provider = self.provider.provider_name(), "Signed in");
        Ok(user)
    }

    pub async fn sign_out(&self) {
        if let Some(user) = self.session.write().await.take() {
            info!(uid = %user.uid, "Signed out");
        }
    }

    /// Signs in, then creates the member record if the account has none.
    ///
    /// An existing record is left untouched. If creating the record fails
    /// the session stays signed in and the error is returned.
    pub async fn sign_in_and_register(
        &self,
        credential: &SignInCredential,
        profile: &MemberProfile,
    ) -> IdentityResult<IdentityUser> {
        let user = self.sign_in(credential).await?;

        let path = self.member_path(&user.uid)?;
        if self.store.read(&path).await?.is_none() {
            if let Err(e) = self.create_member_record(&user, profile).await {
                warn!(uid = %user.uid, error = %e, "Failed to create member record");
                return Err(e);
            }
        }

        Ok(user)
    }

    /// Writes the member record for `user`, replacing any existing one.
    pub async fn create_member_record(
        &self,
        user: &IdentityUser,
        profile: &MemberProfile,
    ) -> IdentityResult<()> {
        let path = self.member_path(&user.uid)?;
        let created_at = user.created_at.unwrap_or_else(|| self.clock.now());

        let mut fields = Fields::new();
        fields.insert("uid".into(), FieldValue::from(user.uid.as_str()));
        fields.insert(
            "email".into(),
            FieldValue::from(user.email.as_deref().unwrap_or_default()),
        );
        fields.insert("createdAt".into(), FieldValue::from(created_at));
        if let Some(name) = &user.display_name {
            fields.insert("displayName".into(), FieldValue::from(name.as_str()));
        }
        if let Some(gender) = &profile.gender {
            fields.insert("gender".into(), FieldValue::from(gender.as_str()));
        }
        fields.extend(profile.extra_fields.clone());

        self.store.write(&path, &fields).await?;
        info!(uid = %user.uid, "Member record created at {}", path);
        Ok(())
    }

    fn member_path(&self, uid: &str) -> IdentityResult<DocumentPath> {
        Ok(self.members.doc(uid)?)
    }
}

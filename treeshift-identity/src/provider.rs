//! Identity providers.
//!
//! Uses the Identity Toolkit v1 REST API (`accounts:signInWithIdp`, then
//! `accounts:lookup` for the account's creation time).

use crate::error::{IdentityError, IdentityResult};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Identity Toolkit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Web API key of the project.
    pub api_key: String,
    /// Base URL for the Identity Toolkit API.
    pub api_base_url: String,
    /// URI reported as the IdP redirect target.
    pub request_uri: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://identitytoolkit.googleapis.com".to_string(),
            request_uri: "http://localhost".to_string(),
        }
    }
}

/// A third-party sign-in result to exchange for an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCredential {
    pub provider_id: String,
    pub id_token: String,
    /// The unhashed nonce whose digest was sent to the provider.
    pub raw_nonce: String,
}

impl SignInCredential {
    pub fn new(
        provider_id: impl Into<String>,
        id_token: impl Into<String>,
        raw_nonce: impl Into<String>,
    ) -> IdentityResult<Self> {
        let credential = Self {
            provider_id: provider_id.into(),
            id_token: id_token.into(),
            raw_nonce: raw_nonce.into(),
        };
        if credential.provider_id.is_empty() {
            return Err(IdentityError::InvalidCredential("missing provider id".into()));
        }
        if credential.id_token.is_empty() {
            return Err(IdentityError::InvalidCredential("missing identity token".into()));
        }
        Ok(credential)
    }

    /// Sign in with Apple.
    pub fn apple(id_token: impl Into<String>, raw_nonce: impl Into<String>) -> IdentityResult<Self> {
        Self::new("apple.com", id_token, raw_nonce)
    }
}

/// A signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityUser {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl IdentityUser {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            created_at: None,
        }
    }
}

/// Exchanges credentials for accounts.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn sign_in(&self, credential: &SignInCredential) -> IdentityResult<IdentityUser>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithIdpResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    id_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    /// Milliseconds since the epoch, as a string.
    created_at: Option<String>,
}

/// [`IdentityProvider`] backed by the Identity Toolkit REST API.
pub struct RestIdentityProvider {
    config: IdentityConfig,
    client: Client,
}

impl RestIdentityProvider {
    pub fn new(config: IdentityConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.api_base_url,
            method,
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn creation_time(&self, id_token: &str) -> IdentityResult<Option<DateTime<Utc>>> {
        let response = self
            .client
            .post(self.endpoint("lookup"))
            .json(&LookupRequest { id_token })
            .send()
            .await?;
        let lookup: LookupResponse = ensure_success(response, "Account lookup")
            .await?
            .json()
            .await
            .map_err(|e| IdentityError::Decode(e.to_string()))?;

        Ok(lookup
            .users
            .first()
            .and_then(|u| u.created_at.as_deref())
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()))
    }
}

async fn ensure_success(response: Response, what: &str) -> IdentityResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error = response.text().await.unwrap_or_default();
    Err(IdentityError::Rejected {
        status: status.as_u16(),
        message: format!("{what} failed: {error}"),
    })
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    fn provider_name(&self) -> &'static str {
        "IdentityToolkit"
    }

    async fn sign_in(&self, credential: &SignInCredential) -> IdentityResult<IdentityUser> {
        debug!("Signing in with {}", credential.provider_id);

        let post_body = format!(
            "id_token={}&providerId={}&nonce={}",
            urlencoding::encode(&credential.id_token),
            urlencoding::encode(&credential.provider_id),
            urlencoding::encode(&credential.raw_nonce)
        );
        let request = SignInWithIdpRequest {
            post_body,
            request_uri: &self.config.request_uri,
            return_idp_credential: true,
            return_secure_token: true,
        };

        let response = self
            .client
            .post(self.endpoint("signInWithIdp"))
            .json(&request)
            .send()
            .await?;
        let signed_in: SignInWithIdpResponse = ensure_success(response, "Sign-in")
            .await?
            .json()
            .await
            .map_err(|e| IdentityError::Decode(e.to_string()))?;

        let created_at = self.creation_time(&signed_in.id_token).await?;
        info!("Signed in account {}", signed_in.local_id);

        Ok(IdentityUser {
            uid: signed_in.local_id,
            email: signed_in.email,
            display_name: signed_in.display_name,
            created_at,
        })
    }
}

//! Firestore storage implementation.
//!
//! Uses the Firestore REST API v1. Works against the hosted service with a
//! bearer token, or against the emulator without one.

mod value;

use crate::error::{StoreError, StoreResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use treeshift_types::{
    CollectionPath, Document, DocumentPath, Fields, Page, PageQuery,
};

use self::value::{decode_fields, encode_fields};

/// Firestore specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    /// Google Cloud project id.
    pub project_id: String,
    /// Database id inside the project.
    pub database_id: String,
    /// Base URL for the REST API (e.g. `https://firestore.googleapis.com`,
    /// or `http://localhost:8080` for the emulator).
    pub api_base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database_id: "(default)".to_string(),
            api_base_url: "https://firestore.googleapis.com".to_string(),
            timeout_secs: 60,
        }
    }
}

/// REST document as returned by get and list.
#[derive(Debug, Deserialize)]
struct RestDocument {
    name: String,
    fields: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RestDocumentList {
    #[serde(default)]
    documents: Vec<RestDocument>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RestErrorBody {
    error: RestError,
}

#[derive(Debug, Deserialize)]
struct RestError {
    #[serde(default)]
    message: String,
}

/// Most writes one commit may carry.
pub const MAX_BATCH_WRITES: usize = 500;

/// Firestore document store.
///
/// A delete batch becomes one commit, so it holds at most
/// [`MAX_BATCH_WRITES`] paths. Wipes must use a page size no larger than that.
pub struct FirestoreStore {
    config: FirestoreConfig,
    client: Client,
    access_token: Arc<RwLock<Option<String>>>,
}

impl FirestoreStore {
    /// Creates a new Firestore store.
    pub fn new(config: FirestoreConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self {
            config,
            client,
            access_token: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets the OAuth2 access token sent with every request.
    pub async fn set_access_token(&self, token: impl Into<String>) {
        *self.access_token.write().await = Some(token.into());
    }

    /// Drops the access token; later requests are unauthenticated.
    pub async fn clear_access_token(&self) {
        *self.access_token.write().await = None;
    }

    /// `projects/{project}/databases/{database}/documents`
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.config.project_id, self.config.database_id
        )
    }

    /// Full resource name of a document, as used inside commit bodies.
    fn resource_name(&self, path: &DocumentPath) -> String {
        format!("{}/{}", self.documents_root(), path)
    }

    /// REST URL for a document or collection path.
    fn url_for(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/v1/{}/{}",
            self.config.api_base_url,
            self.documents_root(),
            encoded.join("/")
        )
    }

    fn commit_url(&self) -> String {
        format!(
            "{}/v1/{}:commit",
            self.config.api_base_url,
            self.documents_root()
        )
    }

    fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Maps a REST document name back to a document path.
    fn path_from_name(&self, name: &str) -> StoreResult<DocumentPath> {
        let root = format!("{}/", self.documents_root());
        let relative = name.strip_prefix(&root).ok_or_else(|| {
            StoreError::Decode(format!("document name outside database: {name}"))
        })?;
        Ok(DocumentPath::parse(relative)?)
    }

    /// Splits a read 404 into a missing document and a missing database.
    async fn absent_or_rejected(
        &self,
        path: &DocumentPath,
        response: Response,
    ) -> StoreResult<Option<Document>> {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RestErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_default();

        if message.contains(&self.resource_name(path)) {
            return Ok(None);
        }
        Err(StoreError::Rejected {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: format!("read failed: {body}"),
        })
    }

    fn to_document(&self, doc: RestDocument) -> StoreResult<Document> {
        let path = self.path_from_name(&doc.name)?;
        let fields = decode_fields(doc.fields.as_ref())?;
        Ok(Document::new(path, fields))
    }
}

/// Turns a non-success response into [`StoreError::Rejected`].
async fn ensure_success(response: Response, what: &str) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message: format!("{what} failed: {error}"),
    })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn backend_name(&self) -> &'static str {
        "Firestore"
    }

    /// A 404 only means "absent" when it names the document. A 404 for a
    /// missing project or database is returned as [`StoreError::Rejected`].
    async fn read(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        debug!("Reading document: {}", path);

        let token = self.token().await;
        let response = self
            .authorize(self.client.get(self.url_for(path.as_str())), token.as_deref())
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("read failed: {e}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return self.absent_or_rejected(path, response).await;
        }
        let response = ensure_success(response, "read").await?;

        let doc: RestDocument = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("failed to parse document: {e}")))?;

        self.to_document(doc).map(Some)
    }

    async fn write(&self, path: &DocumentPath, fields: &Fields) -> StoreResult<()> {
        debug!("Writing document: {} ({} fields)", path, fields.len());

        // No update mask: the stored document is replaced wholesale.
        let body = serde_json::json!({ "fields": encode_fields(fields) });

        let token = self.token().await;
        let response = self
            .authorize(self.client.patch(self.url_for(path.as_str())), token.as_deref())
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("write failed: {e}")))?;

        ensure_success(response, "write").await?;
        Ok(())
    }

    async fn list_page(
        &self,
        collection: &CollectionPath,
        query: &PageQuery,
    ) -> StoreResult<Page> {
        // The REST API keeps no local cache, so both sources hit the server.
        debug!(
            "Listing {} (page size {}, source {:?})",
            collection, query.page_size, query.source
        );

        let page_size = query.page_size.to_string();
        let mut params = vec![("pageSize", page_size.as_str())];
        if let Some(token) = &query.page_token {
            params.push(("pageToken", token.as_str()));
        }

        let token = self.token().await;
        let response = self
            .authorize(
                self.client.get(self.url_for(collection.as_str())),
                token.as_deref(),
            )
            .query(&params)
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("list failed: {e}")))?;

        let response = ensure_success(response, "list").await?;

        let list: RestDocumentList = response
            .json()
            .await
            .map_err(|e| StoreError::Decode(format!("failed to parse document list: {e}")))?;

        let documents = list
            .documents
            .into_iter()
            .map(|doc| self.to_document(doc))
            .collect::<StoreResult<Vec<_>>>()?;

        debug!("Listed {} documents from {}", documents.len(), collection);

        Ok(Page {
            documents,
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn delete_batch(&self, paths: &[DocumentPath]) -> StoreResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        if paths.len() > MAX_BATCH_WRITES {
            return Err(StoreError::BatchTooLarge {
                size: paths.len(),
                limit: MAX_BATCH_WRITES,
            });
        }

        let writes: Vec<serde_json::Value> = paths
            .iter()
            .map(|path| serde_json::json!({ "delete": self.resource_name(path) }))
            .collect();
        let body = serde_json::json!({ "writes": writes });

        let token = self.token().await;
        let response = self
            .authorize(self.client.post(self.commit_url()), token.as_deref())
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Network(format!("commit failed: {e}")))?;

        ensure_success(response, "commit").await?;

        debug!("Deleted {} documents in one commit", paths.len());
        Ok(())
    }
}

//! Document store abstraction trait.

use crate::error::StoreResult;
use async_trait::async_trait;
use treeshift_types::{CollectionPath, Document, DocumentPath, Fields, Page, PageQuery};

/// Abstract document store interface.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the name of the backend.
    fn backend_name(&self) -> &'static str;

    /// Reads one document. Returns `None` when nothing is stored at `path`.
    async fn read(&self, path: &DocumentPath) -> StoreResult<Option<Document>>;

    /// Writes one document, replacing every existing field.
    async fn write(&self, path: &DocumentPath, fields: &Fields) -> StoreResult<()>;

    /// Lists up to `query.page_size` direct children of `collection`.
    ///
    /// Each call reflects the store's current state; a query without a page
    /// token after deletions returns whatever remains.
    async fn list_page(&self, collection: &CollectionPath, query: &PageQuery)
        -> StoreResult<Page>;

    /// Deletes every path in one atomic batch. Missing documents are ignored
    /// and an empty batch is a no-op. Backends may cap the batch size and
    /// refuse larger batches without applying any of them.
    async fn delete_batch(&self, paths: &[DocumentPath]) -> StoreResult<()>;
}

//! Paged wipes and guarded deletes.
//!
//! Every list here reads from the server, so a page never contains
//! documents a previous batch already removed. Subcollections are emptied
//! in the caller's order, and a document is only deleted once all of them
//! are empty.

use crate::engine::TreeEngine;
use crate::error::{EngineError, EngineResult};
use crate::guard::RootGuard;
use crate::report::DeleteReport;
use tracing::{debug, info};
use treeshift_types::{CollectionPath, DocumentPath, PageQuery, PageSize, SubcollectionSpec};

impl TreeEngine {
    /// Deletes one page of `collection` as a single atomic batch.
    ///
    /// Returns `false`, without deleting anything, once the collection reads
    /// empty. Call until it returns `false`.
    pub async fn wipe_page(
        &self,
        collection: &CollectionPath,
        page_size: PageSize,
    ) -> EngineResult<bool> {
        Ok(self.wipe_one_page(collection, page_size).await? > 0)
    }

    /// Empties each named subcollection of `path`, then deletes `path`.
    ///
    /// If a subcollection fails to empty, later subcollections and the
    /// document itself are left alone.
    pub async fn delete_document(
        &self,
        path: &DocumentPath,
        subcollections: &SubcollectionSpec,
        page_size: PageSize,
    ) -> EngineResult<DeleteReport> {
        let report = self.delete_tree(path, subcollections, page_size).await?;
        info!(
            "Deleted {} and {} subcollection documents in {} batches",
            path, report.subcollection_documents_deleted, report.batches
        );
        Ok(report)
    }

    /// Deletes every document of `collection` together with its named
    /// subcollections.
    ///
    /// The guard is checked before the store is touched. The collection is
    /// then read page by page from the server until it comes back empty.
    /// Documents are handled one at a time; the first failure stops the
    /// whole operation, leaving later documents untouched.
    pub async fn delete_collection(
        &self,
        collection: &CollectionPath,
        subcollections: &SubcollectionSpec,
        page_size: PageSize,
        guard: &RootGuard,
    ) -> EngineResult<DeleteReport> {
        guard.check(collection)?;

        let mut report = DeleteReport::default();
        let query = PageQuery::first(page_size).from_server();

        loop {
            let page = self
                .store
                .list_page(collection, &query)
                .await
                .map_err(|e| EngineError::store("list", collection, e))?;

            if page.is_empty() {
                break;
            }
            debug!("Deleting page of {} documents from {}", page.len(), collection);

            for doc in &page.documents {
                let tree = self
                    .delete_tree(&doc.path, subcollections, page_size)
                    .await?;
                report.absorb(tree);
            }
        }

        info!(
            "Deleted collection {}: {} documents, {} subcollection documents, {} batches",
            collection,
            report.documents_deleted,
            report.subcollection_documents_deleted,
            report.batches
        );
        Ok(report)
    }

    async fn delete_tree(
        &self,
        path: &DocumentPath,
        subcollections: &SubcollectionSpec,
        page_size: PageSize,
    ) -> EngineResult<DeleteReport> {
        let mut report = DeleteReport::default();

        for name in subcollections.iter() {
            let sub = path.collection(name)?;
            loop {
                let deleted = self.wipe_one_page(&sub, page_size).await?;
                if deleted == 0 {
                    break;
                }
                report.subcollection_documents_deleted += deleted as u64;
                report.batches += 1;
            }
        }

        self.store
            .delete_batch(std::slice::from_ref(path))
            .await
            .map_err(|e| EngineError::store("delete", path, e))?;

        report.documents_deleted += 1;
        report.batches += 1;
        Ok(report)
    }

    /// Deletes one server-read page; returns how many documents it held.
    async fn wipe_one_page(
        &self,
        collection: &CollectionPath,
        page_size: PageSize,
    ) -> EngineResult<usize> {
        let query = PageQuery::first(page_size).from_server();
        let page = self
            .store
            .list_page(collection, &query)
            .await
            .map_err(|e| EngineError::store("list", collection, e))?;

        if page.is_empty() {
            return Ok(0);
        }

        let paths: Vec<DocumentPath> = page.documents.into_iter().map(|d| d.path).collect();
        self.store
            .delete_batch(&paths)
            .await
            .map_err(|e| EngineError::store("delete batch in", collection, e))?;

        debug!("Wiped {} documents from {}", paths.len(), collection);
        Ok(paths.len())
    }
}

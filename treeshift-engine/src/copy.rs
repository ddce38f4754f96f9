//! Document and collection copies.
//!
//! A copy writes the full field set of each source document over the
//! destination; nothing is merged. Sources with no data are skipped. Named
//! subcollections are copied one level deep, using the same document ids.

use crate::engine::TreeEngine;
use crate::error::{EngineError, EngineResult};
use crate::report::CopyReport;
use tracing::{debug, info};
use treeshift_types::{CollectionPath, DocumentPath, PageQuery, SubcollectionSpec};

impl TreeEngine {
    /// Copies one document and every document of its named subcollections.
    ///
    /// If `source` holds no data the destination document is left alone;
    /// the named subcollections are still copied, since a document can own
    /// subcollections without holding fields itself.
    pub async fn copy_document(
        &self,
        source: &DocumentPath,
        dest: &DocumentPath,
        subcollections: &SubcollectionSpec,
    ) -> EngineResult<CopyReport> {
        let mut report = CopyReport::default();
        self.copy_tree(source, dest, subcollections, &mut report)
            .await?;

        info!(
            "Copied {} -> {}: {} documents, {} skipped",
            source, dest, report.documents_copied, report.documents_skipped
        );
        Ok(report)
    }

    /// Copies every document of `source` into `dest`, each with its named
    /// subcollections. Stops at the first failure; documents already copied
    /// stay copied.
    pub async fn copy_collection(
        &self,
        source: &CollectionPath,
        dest: &CollectionPath,
        subcollections: &SubcollectionSpec,
    ) -> EngineResult<CopyReport> {
        let mut report = CopyReport::default();
        let mut query = PageQuery::first(self.config.copy_page_size);

        loop {
            let page = self
                .store
                .list_page(source, &query)
                .await
                .map_err(|e| EngineError::store("list", source, e))?;

            for doc in &page.documents {
                let target = dest.doc(doc.id())?;
                self.copy_tree(&doc.path, &target, subcollections, &mut report)
                    .await?;
            }

            match page.next_page_token {
                Some(token) => query = query.after(token),
                None => break,
            }
        }

        info!(
            "Copied collection {} -> {}: {} documents, {} skipped",
            source, dest, report.documents_copied, report.documents_skipped
        );
        Ok(report)
    }

    async fn copy_tree(
        &self,
        source: &DocumentPath,
        dest: &DocumentPath,
        subcollections: &SubcollectionSpec,
        report: &mut CopyReport,
    ) -> EngineResult<()> {
        self.copy_fields(source, dest, report).await?;

        for name in subcollections.iter() {
            let from = source.collection(name)?;
            let to = dest.collection(name)?;
            self.copy_flat(&from, &to, report).await?;
        }
        Ok(())
    }

    /// Copies the documents of one subcollection, without descending further.
    async fn copy_flat(
        &self,
        source: &CollectionPath,
        dest: &CollectionPath,
        report: &mut CopyReport,
    ) -> EngineResult<()> {
        let mut query = PageQuery::first(self.config.copy_page_size);

        loop {
            let page = self
                .store
                .list_page(source, &query)
                .await
                .map_err(|e| EngineError::store("list", source, e))?;

            for doc in &page.documents {
                let target = dest.doc(doc.id())?;
                self.copy_fields(&doc.path, &target, report).await?;
            }

            match page.next_page_token {
                Some(token) => query = query.after(token),
                None => return Ok(()),
            }
        }
    }

    /// Reads `source` and overwrites `dest` with its fields.
    async fn copy_fields(
        &self,
        source: &DocumentPath,
        dest: &DocumentPath,
        report: &mut CopyReport,
    ) -> EngineResult<()> {
        let doc = self
            .store
            .read(source)
            .await
            .map_err(|e| EngineError::store("read", source, e))?;

        let Some(doc) = doc else {
            debug!("Skipping {}: no data", source);
            report.documents_skipped += 1;
            return Ok(());
        };

        self.store
            .write(dest, &doc.fields)
            .await
            .map_err(|e| EngineError::store("write", dest, e))?;

        report.documents_copied += 1;
        Ok(())
    }
}

//! In-process document store.
//!
//! Mirrors the remote store's paging and batch semantics exactly, records
//! every call it receives, and can be told to fail selected calls. The tree
//! engine's tests run against it.

use crate::error::{StoreError, StoreResult};
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Mutex, MutexGuard};
use treeshift_types::{
    CollectionPath, Document, DocumentPath, Fields, Page, PageQuery, ReadSource,
};
use tracing::debug;

/// The kind of store call a [`FailureRule`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Read,
    Write,
    ListPage,
    DeleteBatch,
}

/// A call received by a [`MemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Read {
        path: String,
    },
    Write {
        path: String,
    },
    ListPage {
        collection: String,
        page_size: u32,
        source: ReadSource,
        page_token: Option<String>,
    },
    DeleteBatch {
        paths: Vec<String>,
    },
}

impl StoreCall {
    #[must_use]
    pub fn op(&self) -> StoreOp {
        match self {
            Self::Read { .. } => StoreOp::Read,
            Self::Write { .. } => StoreOp::Write,
            Self::ListPage { .. } => StoreOp::ListPage,
            Self::DeleteBatch { .. } => StoreOp::DeleteBatch,
        }
    }
}

/// Makes matching calls fail with [`StoreError::Unavailable`].
///
/// A call matches when its operation is `op` and its path (any path, for a
/// delete batch) starts with `path_prefix`. The first `after` matching calls
/// succeed; every later one fails without touching the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRule {
    pub op: StoreOp,
    pub path_prefix: String,
    pub after: usize,
}

impl FailureRule {
    /// Fails every matching call.
    #[must_use]
    pub fn always(op: StoreOp, path_prefix: impl Into<String>) -> Self {
        Self {
            op,
            path_prefix: path_prefix.into(),
            after: 0,
        }
    }

    /// Lets `after` matching calls through, then fails.
    #[must_use]
    pub fn after(op: StoreOp, path_prefix: impl Into<String>, after: usize) -> Self {
        Self {
            op,
            path_prefix: path_prefix.into(),
            after,
        }
    }
}

#[derive(Default)]
struct Inner {
    /// Documents keyed by full path.
    docs: BTreeMap<String, Fields>,
    calls: Vec<StoreCall>,
    /// Rules with the number of matching calls seen so far.
    rules: Vec<(FailureRule, usize)>,
}

impl Inner {
    fn check_failure(&mut self, op: StoreOp, paths: &[&str]) -> StoreResult<()> {
        for (rule, seen) in &mut self.rules {
            if rule.op != op || !paths.iter().any(|p| p.starts_with(&rule.path_prefix)) {
                continue;
            }
            *seen += 1;
            if *seen > rule.after {
                return Err(StoreError::Unavailable(format!(
                    "injected {:?} failure on {}",
                    op,
                    paths.first().copied().unwrap_or_default()
                )));
            }
        }
        Ok(())
    }
}

/// In-memory [`DocumentStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores a document directly, without recording a call.
    pub fn seed(&self, path: &DocumentPath, fields: Fields) {
        self.lock().docs.insert(path.as_str().to_string(), fields);
    }

    /// Installs a failure rule.
    pub fn fail_on(&self, rule: FailureRule) {
        self.lock().rules.push((rule, 0));
    }

    /// Removes every failure rule.
    pub fn clear_failures(&self) {
        self.lock().rules.clear();
    }

    /// Returns the fields stored at `path`, without recording a call.
    #[must_use]
    pub fn get(&self, path: &DocumentPath) -> Option<Fields> {
        self.lock().docs.get(path.as_str()).cloned()
    }

    #[must_use]
    pub fn contains(&self, path: &DocumentPath) -> bool {
        self.lock().docs.contains_key(path.as_str())
    }

    /// Total number of documents at any depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().docs.is_empty()
    }

    /// Number of direct children of `collection`.
    #[must_use]
    pub fn collection_len(&self, collection: &CollectionPath) -> usize {
        let inner = self.lock();
        children(&inner.docs, collection, None).count()
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Calls of one kind received so far.
    #[must_use]
    pub fn calls_of(&self, op: StoreOp) -> Vec<StoreCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .cloned()
            .collect()
    }

    /// Sizes of the delete batches received so far, in order.
    #[must_use]
    pub fn delete_batch_sizes(&self) -> Vec<usize> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::DeleteBatch { paths } => Some(paths.len()),
                _ => None,
            })
            .collect()
    }

    /// Forgets recorded calls; documents and rules are kept.
    pub fn reset_calls(&self) {
        self.lock().calls.clear();
    }
}

/// Direct children of `collection` ordered by id, starting after `after`.
fn children<'a>(
    docs: &'a BTreeMap<String, Fields>,
    collection: &CollectionPath,
    after: Option<&str>,
) -> impl Iterator<Item = (&'a String, &'a Fields)> + 'a {
    let prefix = format!("{}/", collection.as_str());
    let depth = prefix.len();
    let start = match after {
        Some(id) => Bound::Excluded(format!("{prefix}{id}")),
        None => Bound::Included(prefix.clone()),
    };

    docs.range::<String, _>((start, Bound::Unbounded))
        .take_while(move |(key, _)| key.starts_with(&prefix))
        // Skip documents of nested subcollections.
        .filter(move |(key, _)| !key[depth..].contains('/'))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Read {
            path: path.to_string(),
        });
        inner.check_failure(StoreOp::Read, &[path.as_str()])?;

        Ok(inner
            .docs
            .get(path.as_str())
            .map(|fields| Document::new(path.clone(), fields.clone())))
    }

    async fn write(&self, path: &DocumentPath, fields: &Fields) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::Write {
            path: path.to_string(),
        });
        inner.check_failure(StoreOp::Write, &[path.as_str()])?;

        inner.docs.insert(path.to_string(), fields.clone());
        Ok(())
    }

    async fn list_page(
        &self,
        collection: &CollectionPath,
        query: &PageQuery,
    ) -> StoreResult<Page> {
        let mut inner = self.lock();
        inner.calls.push(StoreCall::ListPage {
            collection: collection.to_string(),
            page_size: query.page_size.get(),
            source: query.source,
            page_token: query.page_token.clone(),
        });
        inner.check_failure(StoreOp::ListPage, &[collection.as_str()])?;

        let limit = query.page_size.as_usize();
        let mut found: Vec<(&String, &Fields)> =
            children(&inner.docs, collection, query.page_token.as_deref())
                .take(limit + 1)
                .collect();

        let more = found.len() > limit;
        found.truncate(limit);

        let documents = found
            .into_iter()
            .map(|(key, fields)| {
                DocumentPath::parse(key).map(|path| Document::new(path, fields.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let next_page_token = if more {
            documents.last().map(|d| d.id().to_string())
        } else {
            None
        };

        debug!(
            "memory list {}: {} documents, more: {}",
            collection,
            documents.len(),
            more
        );

        Ok(Page {
            documents,
            next_page_token,
        })
    }

    async fn delete_batch(&self, paths: &[DocumentPath]) -> StoreResult<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut inner = self.lock();
        let raw: Vec<&str> = paths.iter().map(DocumentPath::as_str).collect();
        inner.calls.push(StoreCall::DeleteBatch {
            paths: raw.iter().map(|p| (*p).to_string()).collect(),
        });
        inner.check_failure(StoreOp::DeleteBatch, &raw)?;

        for path in raw {
            inner.docs.remove(path);
        }
        Ok(())
    }
}

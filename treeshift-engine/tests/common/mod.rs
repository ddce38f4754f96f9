//! Shared test helpers for engine tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use treeshift_engine::TreeEngine;
use treeshift_store::{DocumentStore, MemoryStore, StoreResult};
use treeshift_types::{
    CollectionPath, Document, DocumentPath, FieldValue, Fields, Page, PageQuery, PageSize,
    SubcollectionSpec,
};

pub fn doc(path: &str) -> DocumentPath {
    DocumentPath::parse(path).unwrap()
}

pub fn col(path: &str) -> CollectionPath {
    CollectionPath::parse(path).unwrap()
}

pub fn subs(names: &[&str]) -> SubcollectionSpec {
    SubcollectionSpec::new(names.iter().copied()).unwrap()
}

pub fn size(n: u32) -> PageSize {
    PageSize::new(n).unwrap()
}

/// `{ "n": n }`
pub fn numbered(n: i64) -> Fields {
    let mut f = Fields::new();
    f.insert("n".into(), FieldValue::Integer(n));
    f
}

/// Seeds `count` documents named `d000`, `d001`, ... into `collection`.
pub fn seed_many(store: &MemoryStore, collection: &str, count: usize) {
    let collection = col(collection);
    for i in 0..count {
        let path = collection.doc(&format!("d{i:03}")).unwrap();
        store.seed(&path, numbered(i as i64));
    }
}

/// Seeds a club document with `per_sub` documents in each named subcollection.
pub fn seed_club(store: &MemoryStore, club: &str, names: &[&str], per_sub: usize) {
    let club_path = doc(club);
    store.seed(&club_path, numbered(0));
    for name in names {
        let sub = club_path.collection(name).unwrap();
        for i in 0..per_sub {
            store.seed(&sub.doc(&format!("{name}{i}")).unwrap(), numbered(i as i64));
        }
    }
}

/// Routes engine logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn engine_over(store: &Arc<MemoryStore>) -> TreeEngine {
    TreeEngine::new(store.clone())
}

/// Wraps a store and reports selected documents as absent on read, as if
/// they were deleted between a list and the following read.
pub struct VanishingStore {
    pub inner: Arc<MemoryStore>,
    pub vanished: HashSet<String>,
}

impl VanishingStore {
    pub fn new(inner: Arc<MemoryStore>, vanished: &[&str]) -> Self {
        Self {
            inner,
            vanished: vanished.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

#[async_trait]
impl DocumentStore for VanishingStore {
    fn backend_name(&self) -> &'static str {
        "vanishing"
    }

    async fn read(&self, path: &DocumentPath) -> StoreResult<Option<Document>> {
        if self.vanished.contains(path.as_str()) {
            return Ok(None);
        }
        self.inner.read(path).await
    }

    async fn write(&self, path: &DocumentPath, fields: &Fields) -> StoreResult<()> {
        self.inner.write(path, fields).await
    }

    async fn list_page(
        &self,
        collection: &CollectionPath,
        query: &PageQuery,
    ) -> StoreResult<Page> {
        self.inner.list_page(collection, query).await
    }

    async fn delete_batch(&self, paths: &[DocumentPath]) -> StoreResult<()> {
        self.inner.delete_batch(paths).await
    }
}

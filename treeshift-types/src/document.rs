//! Documents, pages and page queries.

use crate::{DocumentPath, Error, Fields, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Page size used when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// A document: its path plus its full field set.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocumentPath,
    pub fields: Fields,
}

impl Document {
    #[must_use]
    pub fn new(path: DocumentPath, fields: Fields) -> Self {
        Self { path, fields }
    }

    /// Returns the document id (the last path segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.path.id()
    }
}

/// Maximum number of documents fetched per list query, and therefore the
/// maximum size of one atomic delete batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(NonZeroU32);

impl PageSize {
    /// Creates a page size, rejecting zero.
    pub fn new(size: u32) -> Result<Self> {
        NonZeroU32::new(size)
            .map(Self)
            .ok_or(Error::InvalidPageSize(size))
    }

    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0.get()
    }

    #[must_use]
    pub const fn as_usize(&self) -> usize {
        self.0.get() as usize
    }
}

impl Default for PageSize {
    fn default() -> Self {
        match NonZeroU32::new(DEFAULT_PAGE_SIZE) {
            Some(size) => Self(size),
            None => unreachable!("default page size is non-zero"),
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// Where a list query may be answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadSource {
    /// Any source the client prefers, including a local cache.
    #[default]
    Default,
    /// The server only. Destructive paging always uses this.
    Server,
}

/// Parameters for one list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page_size: PageSize,
    pub source: ReadSource,
    /// Continuation token from a previous page; `None` starts from the beginning.
    pub page_token: Option<String>,
}

impl PageQuery {
    /// The first page of a collection.
    #[must_use]
    pub fn first(page_size: PageSize) -> Self {
        Self {
            page_size,
            source: ReadSource::Default,
            page_token: None,
        }
    }

    /// Forces the query to bypass any local cache.
    #[must_use]
    pub fn from_server(mut self) -> Self {
        self.source = ReadSource::Server;
        self
    }

    /// Continues after a previous page.
    #[must_use]
    pub fn after(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }
}

/// One bounded batch of documents returned by a list query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub documents: Vec<Document>,
    /// Set when more documents may remain after this page.
    pub next_page_token: Option<String>,
}

impl Page {
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_page_token.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

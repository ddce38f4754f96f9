//! Collection and document paths.
//!
//! Paths are slash-separated ids. A collection path has an odd number of
//! segments (`clubs`, `clubs/c1/roles`), a document path an even number
//! (`clubs/c1`, `clubs/c1/roles/admin`).

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Checks a single path segment and returns it unchanged.
pub(crate) fn validate_segment<'a>(full: &str, segment: &'a str) -> Result<&'a str> {
    let reason = if segment.is_empty() {
        "empty segment"
    } else if segment == "." || segment == ".." {
        "segment may not be '.' or '..'"
    } else if segment.contains('/') {
        "segment may not contain '/'"
    } else {
        return Ok(segment);
    };

    Err(Error::InvalidPath {
        path: full.to_string(),
        reason: reason.to_string(),
    })
}

fn validate(path: &str, want_odd: bool) -> Result<()> {
    let mut count = 0usize;
    for segment in path.split('/') {
        validate_segment(path, segment)?;
        count += 1;
    }

    if (count % 2 == 1) != want_odd {
        let kind = if want_odd { "collection" } else { "document" };
        return Err(Error::InvalidPath {
            path: path.to_string(),
            reason: format!("{count} segments is not a {kind} path"),
        });
    }

    Ok(())
}

/// Path of a collection, e.g. `clubs` or `clubs/c1/roles`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Parses and validates a collection path.
    pub fn parse(path: &str) -> Result<Self> {
        validate(path, true)?;
        Ok(Self(path.to_string()))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the collection id (the last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the owning document, or `None` for a root collection.
    #[must_use]
    pub fn parent(&self) -> Option<DocumentPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| DocumentPath(parent.to_string()))
    }

    /// Returns the path of the document `id` inside this collection.
    pub fn doc(&self, id: &str) -> Result<DocumentPath> {
        validate_segment(id, id)?;
        Ok(DocumentPath(format!("{}/{}", self.0, id)))
    }

    /// Returns true if the textual path starts with `prefix`.
    #[must_use]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CollectionPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CollectionPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        validate(&value, true)?;
        Ok(Self(value))
    }
}

impl From<CollectionPath> for String {
    fn from(path: CollectionPath) -> Self {
        path.0
    }
}

/// Path of a document, e.g. `clubs/c1` or `clubs/c1/roles/admin`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Parses and validates a document path.
    pub fn parse(path: &str) -> Result<Self> {
        validate(path, false)?;
        Ok(Self(path.to_string()))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the document id (the last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the collection containing this document.
    #[must_use]
    pub fn parent(&self) -> CollectionPath {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => CollectionPath(parent.to_string()),
            None => CollectionPath(self.0.clone()),
        }
    }

    /// Returns the path of the subcollection `name` owned by this document.
    pub fn collection(&self, name: &str) -> Result<CollectionPath> {
        validate_segment(name, name)?;
        Ok(CollectionPath(format!("{}/{}", self.0, name)))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        validate(&value, false)?;
        Ok(Self(value))
    }
}

impl From<DocumentPath> for String {
    fn from(path: DocumentPath) -> Self {
        path.0
    }
}

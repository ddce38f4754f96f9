//! Caller-declared subcollection names.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordered list of subcollection names applied to every document a copy or
/// delete touches. The store is never asked which subcollections exist.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SubcollectionSpec(Vec<String>);

impl SubcollectionSpec {
    /// Builds a spec, rejecting empty names, names containing `/`, and duplicates.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            let reason = if name.is_empty() {
                Some("empty name")
            } else if name.contains('/') {
                Some("name may not contain '/'")
            } else if name == "." || name == ".." {
                Some("name may not be '.' or '..'")
            } else if out.contains(&name) {
                Some("duplicate name")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(Error::InvalidSubcollection {
                    name,
                    reason: reason.to_string(),
                });
            }
            out.push(name);
        }
        Ok(Self(out))
    }

    /// No subcollections: only the documents themselves are touched.
    #[must_use]
    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for SubcollectionSpec {
    type Error = Error;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SubcollectionSpec> for Vec<String> {
    fn from(spec: SubcollectionSpec) -> Self {
        spec.0
    }
}

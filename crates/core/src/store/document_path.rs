//! Path types addressing documents in the remote store.

use crate::constants::{DISASTER_METADATA_COLLECTION, USER_SHAPES_COLLECTION};

/// Root of the document store.
///
/// Production uses the database root directly. Tests scope every path
/// under a per-run scratch document so concurrent runs do not collide.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreRoot {
    prefix: Option<String>,
}

impl StoreRoot {
    /// The real database root.
    pub fn production() -> Self {
        Self { prefix: None }
    }

    /// A scratch root at `test/<token>`, for test isolation.
    pub fn test_scratch(token: &str) -> Self {
        Self {
            prefix: Some(format!("test/{token}")),
        }
    }

    /// A top-level collection under this root.
    pub fn collection(&self, name: &str) -> CollectionPath {
        let path = match &self.prefix {
            Some(prefix) => format!("{prefix}/{name}"),
            None => name.to_string(),
        };
        CollectionPath { path }
    }

    /// The collection holding per-disaster metadata documents.
    pub fn disaster_metadata(&self) -> CollectionPath {
        self.collection(DISASTER_METADATA_COLLECTION)
    }

    /// The collection holding user-drawn region documents.
    pub fn user_shapes(&self) -> CollectionPath {
        self.collection(USER_SHAPES_COLLECTION)
    }
}

/// Root-relative path of a collection, with alternating
/// collection/document segments (`test/abc/disaster-metadata`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    path: String,
}

impl CollectionPath {
    /// A document inside this collection.
    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Root-relative path of a single document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

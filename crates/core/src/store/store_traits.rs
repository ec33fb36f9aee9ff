//! Document store trait.
//!
//! This trait defines the contract for document CRUD without any
//! client-specific types, allowing for different store implementations.

use async_trait::async_trait;

use super::document_path::{CollectionPath, DocumentPath};
use crate::errors::Result;

/// A schema-less document payload: top-level field names to JSON values.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Trait defining the contract for remote document-store operations.
///
/// Implementations handle transport, authentication headers, and wire
/// encoding. All methods address documents through root-relative paths;
/// the [`StoreRoot`](super::StoreRoot) test prefix is already baked into
/// the paths by the time they reach an implementation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the document at `path`.
    ///
    /// Returns `StoreError::NotFound` if no document exists there.
    async fn get(&self, path: &DocumentPath) -> Result<Document>;

    /// Replaces the document at `path` with `fields`, creating it if
    /// absent. Fields not named in `fields` are removed.
    async fn set(&self, path: &DocumentPath, fields: Document) -> Result<()>;

    /// Merges `fields` into the document at `path`, creating it if
    /// absent. Top-level fields named in `fields` are replaced; other
    /// fields are preserved.
    async fn merge(&self, path: &DocumentPath, fields: Document) -> Result<()>;

    /// Adds a document with a store-generated id to `collection`,
    /// returning the new id.
    async fn add(&self, collection: &CollectionPath, fields: Document) -> Result<String>;

    /// Deletes the document at `path`. Deleting an absent document is
    /// not an error.
    async fn delete(&self, path: &DocumentPath) -> Result<()>;

    /// Lists all documents in `collection` as (id, fields) pairs.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Document)>>;
}

//! In-memory document store for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::document_path::{CollectionPath, DocumentPath};
use super::store_traits::{Document, DocumentStore};
use crate::errors::{Result, StoreError};

/// Document store backed by a process-local map, for tests and offline
/// tooling. Path semantics match the remote client: documents live
/// under `collection/id` keys, merge replaces top-level fields only.
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<BTreeMap<String, Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, for test assertions.
    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Document> {
        self.documents
            .lock()
            .unwrap()
            .get(&path.to_string())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()).into())
    }

    async fn set(&self, path: &DocumentPath, fields: Document) -> Result<()> {
        self.documents
            .lock()
            .unwrap()
            .insert(path.to_string(), fields);
        Ok(())
    }

    async fn merge(&self, path: &DocumentPath, fields: Document) -> Result<()> {
        let mut documents = self.documents.lock().unwrap();
        let entry = documents.entry(path.to_string()).or_default();
        for (name, value) in fields {
            entry.insert(name, value);
        }
        Ok(())
    }

    async fn add(&self, collection: &CollectionPath, fields: Document) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        self.documents
            .lock()
            .unwrap()
            .insert(collection.doc(&id).to_string(), fields);
        Ok(id)
    }

    async fn delete(&self, path: &DocumentPath) -> Result<()> {
        self.documents.lock().unwrap().remove(&path.to_string());
        Ok(())
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Document)>> {
        let prefix = format!("{}/", collection.as_str());
        let documents = self.documents.lock().unwrap();
        Ok(documents
            .iter()
            .filter_map(|(key, fields)| {
                let id = key.strip_prefix(&prefix)?;
                // Direct children only; nested subcollection documents
                // have further path segments.
                if id.contains('/') {
                    return None;
                }
                Some((id.to_string(), fields.clone()))
            })
            .collect())
    }
}

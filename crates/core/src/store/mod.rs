//! Remote document-store abstraction.
//!
//! The store is schema-less: documents are JSON maps addressed by
//! alternating collection/document path segments. The concrete client
//! lives in the `storage-firestore` crate; tests use
//! [`MemoryDocumentStore`].

mod document_path;
mod geo_point;
mod memory_store;
mod store_traits;

pub use document_path::{CollectionPath, DocumentPath, StoreRoot};
pub use geo_point::GeoPoint;
pub use memory_store::MemoryDocumentStore;
pub use store_traits::{Document, DocumentStore};

//! Disasters module - domain models, service, and traits.

mod disasters_model;
mod disasters_service;
mod disasters_traits;

#[cfg(test)]
mod disasters_model_tests;

// Re-export the public interface
pub use disasters_model::{AssetData, Disaster, DisasterMetadata, NewDisaster, SnapData};
pub use disasters_service::{DisasterService, MetadataWriteSink};
pub use disasters_traits::DisasterServiceTrait;

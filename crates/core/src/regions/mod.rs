//! User-drawn regions module - domain models, service, and traits.

mod regions_model;
mod regions_service;
mod regions_traits;

// Re-export the public interface
pub use regions_model::{CalculatedData, UserRegion};
pub use regions_service::{RegionKey, RegionService};
pub use regions_traits::{GeoAnalysis, MockGeoAnalysis};

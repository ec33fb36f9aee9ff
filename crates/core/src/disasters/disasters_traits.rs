//! Disaster service trait.
//!
//! Defines the contract for disaster CRUD without any store-specific
//! types.

use async_trait::async_trait;

use super::disasters_model::{Disaster, DisasterMetadata, NewDisaster};
use crate::errors::Result;

/// Trait defining the contract for disaster operations.
#[async_trait]
pub trait DisasterServiceTrait: Send + Sync {
    /// All known disasters, sorted by id.
    async fn list_disasters(&self) -> Result<Vec<Disaster>>;

    /// Fetches the current disaster's metadata document and makes it the
    /// service's working copy.
    async fn load_metadata(&self) -> Result<DisasterMetadata>;

    /// Creates a disaster after validating its id and states, and writes
    /// its initial metadata document.
    async fn add_disaster(&self, new_disaster: NewDisaster) -> Result<Disaster>;

    /// Deletes a disaster's metadata document.
    async fn delete_disaster(&self, disaster_id: &str) -> Result<()>;
}

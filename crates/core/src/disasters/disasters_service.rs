//! Disaster metadata service.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::disasters_model::{Disaster, DisasterMetadata, NewDisaster};
use super::disasters_traits::DisasterServiceTrait;
use crate::coordination::{DebouncedWriter, WriteHandle, WriteSink};
use crate::errors::Result;
use crate::events::WriteObserver;
use crate::session::SessionContext;
use crate::store::{Document, DocumentStore};

/// Sink that merges a payload into the session's current disaster
/// metadata document. Shared by every editor that debounces writes to
/// that document.
pub struct MetadataWriteSink {
    store: Arc<dyn DocumentStore>,
    session: Arc<SessionContext>,
}

impl MetadataWriteSink {
    pub fn new(store: Arc<dyn DocumentStore>, session: Arc<SessionContext>) -> Self {
        Self { store, session }
    }
}

#[async_trait]
impl WriteSink<Document> for MetadataWriteSink {
    async fn write(&self, payload: Document) -> Result<()> {
        self.store.merge(&self.session.metadata_path(), payload).await
    }
}

/// Service for managing disasters and editing the current disaster's
/// metadata. Metadata edits are applied to an in-memory working copy and
/// persisted through a debounced writer, so bursts of edits collapse
/// into at most one in-flight write plus one follow-up.
pub struct DisasterService {
    store: Arc<dyn DocumentStore>,
    session: Arc<SessionContext>,
    metadata: Arc<RwLock<DisasterMetadata>>,
    writer: DebouncedWriter<Document>,
}

impl DisasterService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        session: Arc<SessionContext>,
        observer: Arc<dyn WriteObserver>,
    ) -> Self {
        let metadata: Arc<RwLock<DisasterMetadata>> = Arc::default();
        let supplier_metadata = metadata.clone();
        let sink = Arc::new(MetadataWriteSink::new(store.clone(), session.clone()));
        let writer = DebouncedWriter::new(
            move || metadata_fields(&supplier_metadata.read().unwrap()),
            sink,
            observer,
        );
        Self {
            store,
            session,
            metadata,
            writer,
        }
    }

    /// Snapshot of the working copy.
    pub fn metadata(&self) -> DisasterMetadata {
        self.metadata.read().unwrap().clone()
    }

    /// Applies `mutate` to the working copy and requests a store write.
    ///
    /// Returns the handle tracking the write this call started, or
    /// `None` when the edit was coalesced into a write already in
    /// flight.
    pub fn edit_metadata(&self, mutate: impl FnOnce(&mut DisasterMetadata)) -> Option<WriteHandle> {
        mutate(&mut self.metadata.write().unwrap());
        self.writer.request_write()
    }

    /// Metadata writes currently in flight.
    pub fn pending_writes(&self) -> usize {
        self.writer.pending_writes()
    }
}

#[async_trait]
impl DisasterServiceTrait for DisasterService {
    async fn list_disasters(&self) -> Result<Vec<Disaster>> {
        let documents = self
            .store
            .list(&self.session.root().disaster_metadata())
            .await?;
        let mut disasters: Vec<Disaster> = documents
            .into_iter()
            .map(|(id, fields)| Disaster {
                id,
                states: fields
                    .get("states")
                    .and_then(|value| serde_json::from_value(value.clone()).ok())
                    .unwrap_or_default(),
            })
            .collect();
        disasters.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(disasters)
    }

    async fn load_metadata(&self) -> Result<DisasterMetadata> {
        let fields = self.store.get(&self.session.metadata_path()).await?;
        let metadata: DisasterMetadata = serde_json::from_value(Value::Object(fields))?;
        *self.metadata.write().unwrap() = metadata.clone();
        Ok(metadata)
    }

    async fn add_disaster(&self, new_disaster: NewDisaster) -> Result<Disaster> {
        let id = new_disaster.validated_id()?;
        debug!("Creating disaster {id}");
        let mut fields = Document::new();
        fields.insert("layers".to_string(), Value::Array(Vec::new()));
        fields.insert(
            "states".to_string(),
            serde_json::to_value(&new_disaster.states)?,
        );
        let path = self.session.root().disaster_metadata().doc(&id);
        self.store.set(&path, fields).await?;
        Ok(Disaster {
            id,
            states: new_disaster.states,
        })
    }

    async fn delete_disaster(&self, disaster_id: &str) -> Result<()> {
        let path = self.session.root().disaster_metadata().doc(disaster_id);
        self.store.delete(&path).await
    }
}

/// Fields the metadata editor owns. The layer list is written by the
/// layer-management editor through its own writer, so it is left out of
/// this merge payload.
fn metadata_fields(metadata: &DisasterMetadata) -> Document {
    let mut fields = Document::new();
    fields.insert(
        "states".to_string(),
        serde_json::to_value(&metadata.states).expect("states serialize to JSON"),
    );
    if let Some(asset_data) = &metadata.asset_data {
        fields.insert(
            "asset_data".to_string(),
            serde_json::to_value(asset_data).expect("asset data serializes to JSON"),
        );
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disasters::AssetData;
    use crate::errors::{Error, StoreError};
    use crate::events::NoOpWriteObserver;
    use crate::store::{MemoryDocumentStore, StoreRoot};

    fn service() -> (Arc<MemoryDocumentStore>, Arc<SessionContext>, DisasterService) {
        let store = Arc::new(MemoryDocumentStore::new());
        let session = Arc::new(SessionContext::new(StoreRoot::test_scratch("run")));
        let service = DisasterService::new(
            store.clone(),
            session.clone(),
            Arc::new(NoOpWriteObserver),
        );
        (store, session, service)
    }

    fn new_disaster() -> NewDisaster {
        NewDisaster {
            year: 2017,
            name: "harvey".to_string(),
            states: vec!["TX".to_string()],
        }
    }

    #[tokio::test]
    async fn test_add_and_list_disasters() {
        let (_store, _session, service) = service();
        let added = service.add_disaster(new_disaster()).await.unwrap();
        assert_eq!(added.id, "2017-harvey");

        service
            .add_disaster(NewDisaster {
                year: 2018,
                name: "michael".to_string(),
                states: vec!["FL".to_string(), "GA".to_string()],
            })
            .await
            .unwrap();

        let disasters = service.list_disasters().await.unwrap();
        assert_eq!(disasters.len(), 2);
        assert_eq!(disasters[0].id, "2017-harvey");
        assert_eq!(disasters[1].states, vec!["FL", "GA"]);
    }

    #[tokio::test]
    async fn test_add_disaster_rejects_bad_names() {
        let (_store, _session, service) = service();
        let mut bad = new_disaster();
        bad.name = "Hurricane Harvey".to_string();
        let err = service.add_disaster(bad).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let mut no_states = new_disaster();
        no_states.states.clear();
        assert!(service.add_disaster(no_states).await.is_err());
    }

    #[tokio::test]
    async fn test_load_metadata_round_trip() {
        let (_store, _session, service) = service();
        service.add_disaster(new_disaster()).await.unwrap();
        let metadata = service.load_metadata().await.unwrap();
        assert_eq!(metadata.states, vec!["TX"]);
        assert!(metadata.layers.is_empty());
        assert!(metadata.asset_data.is_none());
    }

    #[tokio::test]
    async fn test_load_metadata_for_unknown_disaster_fails() {
        let (_store, session, service) = service();
        session.set_current_disaster("1900-nothing");
        let err = service.load_metadata().await.unwrap_err();
        assert!(matches!(err, Error::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_edit_metadata_persists_through_writer() {
        let (store, session, service) = service();
        service.add_disaster(new_disaster()).await.unwrap();
        service.load_metadata().await.unwrap();

        let handle = service
            .edit_metadata(|metadata| {
                let asset_data = metadata.asset_data.get_or_insert_with(AssetData::default);
                asset_data.damage_asset_path =
                    Some("users/gd/2017-harvey/fema-damage".to_string());
            })
            .expect("idle writer starts a write");
        handle.finished().await.unwrap();
        assert_eq!(service.pending_writes(), 0);

        let fields = store.get(&session.metadata_path()).await.unwrap();
        assert_eq!(
            fields["asset_data"]["damage_asset_path"],
            serde_json::json!("users/gd/2017-harvey/fema-damage")
        );
        // The layer list is not owned by this editor and must survive.
        assert_eq!(fields["layers"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_delete_disaster() {
        let (store, _session, service) = service();
        service.add_disaster(new_disaster()).await.unwrap();
        service.delete_disaster("2017-harvey").await.unwrap();
        assert!(store.is_empty());
    }
}

//! Layer management service.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::layers_model::Layer;
use crate::coordination::{DebouncedWriter, WriteHandle};
use crate::disasters::MetadataWriteSink;
use crate::errors::{Result, ValidationError};
use crate::events::WriteObserver;
use crate::session::SessionContext;
use crate::store::{Document, DocumentStore};

/// Service for editing the current disaster's ordered layer list.
///
/// Every mutation goes through a debounced writer that merges the whole
/// list into the metadata document, so rapid-fire edits (checkbox
/// toggles, reorders) collapse into at most one in-flight write plus one
/// follow-up carrying the final list.
pub struct LayerService {
    store: Arc<dyn DocumentStore>,
    session: Arc<SessionContext>,
    layers: Arc<RwLock<Vec<Layer>>>,
    writer: DebouncedWriter<Document>,
}

impl LayerService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        session: Arc<SessionContext>,
        observer: Arc<dyn WriteObserver>,
    ) -> Self {
        let layers: Arc<RwLock<Vec<Layer>>> = Arc::default();
        let supplier_layers = layers.clone();
        let sink = Arc::new(MetadataWriteSink::new(store.clone(), session.clone()));
        let writer = DebouncedWriter::new(
            move || layers_document(&supplier_layers.read().unwrap()),
            sink,
            observer,
        );
        Self {
            store,
            session,
            layers,
            writer,
        }
    }

    /// Populates the working list from the current disaster's metadata
    /// document. A missing document means a fresh disaster with no
    /// layers yet.
    pub async fn load(&self) -> Result<()> {
        use crate::errors::{Error, StoreError};
        let layers = match self.store.get(&self.session.metadata_path()).await {
            Ok(fields) => match fields.get("layers") {
                Some(value) => serde_json::from_value(value.clone())?,
                None => Vec::new(),
            },
            Err(Error::Store(StoreError::NotFound(_))) => Vec::new(),
            Err(err) => return Err(err),
        };
        *self.layers.write().unwrap() = layers;
        Ok(())
    }

    /// Snapshot of the working list, in display order.
    pub fn layers(&self) -> Vec<Layer> {
        self.layers.read().unwrap().clone()
    }

    /// Appends a layer and requests a write.
    pub fn add_layer(&self, layer: Layer) -> Option<WriteHandle> {
        self.layers.write().unwrap().push(layer);
        self.writer.request_write()
    }

    /// Applies `mutate` to the layer at `index` and requests a write.
    pub fn update_layer(
        &self,
        index: usize,
        mutate: impl FnOnce(&mut Layer),
    ) -> Result<Option<WriteHandle>> {
        {
            let mut layers = self.layers.write().unwrap();
            let layer = layers
                .get_mut(index)
                .ok_or_else(|| layer_index_error(index))?;
            mutate(layer);
        }
        Ok(self.writer.request_write())
    }

    /// Removes the layer at `index` and requests a write.
    pub fn remove_layer(&self, index: usize) -> Result<Option<WriteHandle>> {
        {
            let mut layers = self.layers.write().unwrap();
            if index >= layers.len() {
                return Err(layer_index_error(index));
            }
            layers.remove(index);
        }
        Ok(self.writer.request_write())
    }

    /// Swaps two layers' display positions and requests a write.
    pub fn swap_layers(&self, a: usize, b: usize) -> Result<Option<WriteHandle>> {
        {
            let mut layers = self.layers.write().unwrap();
            if a >= layers.len() {
                return Err(layer_index_error(a));
            }
            if b >= layers.len() {
                return Err(layer_index_error(b));
            }
            layers.swap(a, b);
        }
        Ok(self.writer.request_write())
    }

    /// Layer-list writes currently in flight.
    pub fn pending_writes(&self) -> usize {
        self.writer.pending_writes()
    }
}

fn layers_document(layers: &[Layer]) -> Document {
    let mut fields = Document::new();
    fields.insert(
        "layers".to_string(),
        serde_json::to_value(layers).expect("layers serialize to JSON"),
    );
    fields
}

fn layer_index_error(index: usize) -> crate::errors::Error {
    ValidationError::InvalidInput(format!("no layer at index {index}")).into()
}

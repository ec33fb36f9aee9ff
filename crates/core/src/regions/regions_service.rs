//! User-drawn region persistence service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use uuid::Uuid;

use super::regions_model::{CalculatedData, UserRegion};
use super::regions_traits::GeoAnalysis;
use crate::coordination::{DebouncedWriter, WriteHandle, WriteSink};
use crate::errors::{Error, Result, StoreError, ValidationError};
use crate::events::WriteObserver;
use crate::store::{CollectionPath, Document, DocumentStore, GeoPoint};

/// Process-local handle for one tracked region. Regions freshly drawn in
/// this session get a generated key; loaded regions use their store id.
pub type RegionKey = String;

/// Holds one region's edit state and the state of writing it to the
/// backend: the live draft the UI mutates, the snapshot last handed to a
/// write, and the region's own debounced writer.
struct StoredRegion {
    draft: Arc<RwLock<UserRegion>>,
    /// Geometry and notes as of the last requested write, for change
    /// detection.
    last_saved: Mutex<(Vec<GeoPoint>, String)>,
    doc_id: Arc<Mutex<Option<String>>>,
    writer: DebouncedWriter<UserRegion>,
}

/// Sink writing one region document, adding it on first write to obtain
/// a store id.
struct RegionWriteSink {
    store: Arc<dyn DocumentStore>,
    collection: CollectionPath,
    doc_id: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl WriteSink<UserRegion> for RegionWriteSink {
    async fn write(&self, payload: UserRegion) -> Result<()> {
        let fields = region_fields(&payload)?;
        let existing_id = self.doc_id.lock().unwrap().clone();
        match existing_id {
            Some(id) => self.store.set(&self.collection.doc(&id), fields).await,
            None => {
                let id = self.store.add(&self.collection, fields).await?;
                *self.doc_id.lock().unwrap() = Some(id);
                Ok(())
            }
        }
    }
}

/// Service for user-drawn damage regions and markers.
///
/// Each region document has exactly one writer, so edits to a region
/// serialize and coalesce independently of other regions. Polygon
/// geometry changes trigger a damage recomputation on the analysis
/// backend before the write is requested.
pub struct RegionService {
    store: Arc<dyn DocumentStore>,
    analysis: Arc<dyn GeoAnalysis>,
    observer: Arc<dyn WriteObserver>,
    collection: CollectionPath,
    regions: RwLock<HashMap<RegionKey, Arc<StoredRegion>>>,
    deletes_in_flight: AtomicUsize,
}

impl RegionService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        analysis: Arc<dyn GeoAnalysis>,
        collection: CollectionPath,
        observer: Arc<dyn WriteObserver>,
    ) -> Self {
        Self {
            store,
            analysis,
            observer,
            collection,
            regions: RwLock::new(HashMap::new()),
            deletes_in_flight: AtomicUsize::new(0),
        }
    }

    /// Fetches all stored regions and starts tracking them. Returns the
    /// keys of the loaded regions.
    pub async fn load_regions(&self) -> Result<Vec<RegionKey>> {
        let documents = self.store.list(&self.collection).await?;
        let mut keys = Vec::with_capacity(documents.len());
        for (id, fields) in documents {
            let region: UserRegion = serde_json::from_value(Value::Object(fields))?;
            let tracked = self.track(region.clone(), Some(id.clone()));
            // Loaded state is the saved state; only later edits write.
            *tracked.last_saved.lock().unwrap() = (region.geometry, region.notes);
            keys.push(id);
        }
        Ok(keys)
    }

    /// Starts tracking a freshly drawn region. Nothing is written until
    /// [`save_region`](Self::save_region) is called.
    pub fn create_region(&self, geometry: Vec<GeoPoint>, notes: impl Into<String>) -> RegionKey {
        let key = Uuid::new_v4().to_string();
        let region = UserRegion::new(geometry, notes);
        let tracked = self.track(region, None);
        self.regions
            .write()
            .unwrap()
            .insert(key.clone(), tracked);
        key
    }

    /// Snapshot of a tracked region's draft.
    pub fn region(&self, key: &str) -> Result<UserRegion> {
        Ok(self.tracked(key)?.draft.read().unwrap().clone())
    }

    /// Applies `mutate` to a region's draft. Call
    /// [`save_region`](Self::save_region) to persist.
    pub fn edit_region(&self, key: &str, mutate: impl FnOnce(&mut UserRegion)) -> Result<()> {
        let tracked = self.tracked(key)?;
        mutate(&mut tracked.draft.write().unwrap());
        Ok(())
    }

    /// Persists a region's draft.
    ///
    /// Unchanged drafts are not written at all. A changed polygon
    /// geometry first gets its damage count recomputed. Returns the
    /// handle tracking the write this call started, or `None` when
    /// nothing needed writing or the request coalesced into a write
    /// already in flight.
    pub async fn save_region(&self, key: &str) -> Result<Option<WriteHandle>> {
        let tracked = self.tracked(key)?;
        let (geometry_changed, notes_changed, geometry, is_marker) = {
            let draft = tracked.draft.read().unwrap();
            let mut last_saved = tracked.last_saved.lock().unwrap();
            let geometry_changed = last_saved.0 != draft.geometry;
            let notes_changed = last_saved.1 != draft.notes;
            *last_saved = (draft.geometry.clone(), draft.notes.clone());
            (
                geometry_changed,
                notes_changed,
                draft.geometry.clone(),
                draft.is_marker(),
            )
        };
        if !geometry_changed && !notes_changed {
            debug!("region {key} unchanged; skipping write");
            return Ok(None);
        }
        if geometry_changed && !is_marker {
            let damage = self.analysis.damage_inside(&geometry).await?;
            tracked.draft.write().unwrap().calculated_data = Some(CalculatedData { damage });
        }
        Ok(tracked.writer.request_write())
    }

    /// Deletes a region from the store and stops tracking it.
    ///
    /// A region drawn this session must have completed its first save
    /// before it can be deleted; until then it has no store document.
    pub async fn delete_region(&self, key: &str) -> Result<()> {
        let tracked = self.tracked(key)?;
        let doc_id = tracked.doc_id.lock().unwrap().clone().ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(
                "region has no stored document to delete".to_string(),
            ))
        })?;
        self.deletes_in_flight.fetch_add(1, Ordering::AcqRel);
        let result = self.store.delete(&self.collection.doc(&doc_id)).await;
        self.deletes_in_flight.fetch_sub(1, Ordering::AcqRel);
        result?;
        self.regions.write().unwrap().remove(key);
        Ok(())
    }

    /// Store id of a region, once its first save has completed.
    pub fn document_id(&self, key: &str) -> Result<Option<String>> {
        Ok(self.tracked(key)?.doc_id.lock().unwrap().clone())
    }

    /// Total writes in flight across all tracked regions, so the shell
    /// can warn before discarding a session with unsaved work.
    pub fn pending_writes(&self) -> usize {
        let regions = self.regions.read().unwrap();
        regions
            .values()
            .map(|tracked| tracked.writer.pending_writes())
            .sum::<usize>()
            + self.deletes_in_flight.load(Ordering::Acquire)
    }

    fn track(&self, region: UserRegion, doc_id: Option<String>) -> Arc<StoredRegion> {
        let draft = Arc::new(RwLock::new(region));
        let doc_id = Arc::new(Mutex::new(doc_id));
        let sink = Arc::new(RegionWriteSink {
            store: self.store.clone(),
            collection: self.collection.clone(),
            doc_id: doc_id.clone(),
        });
        let supplier_draft = draft.clone();
        let writer = DebouncedWriter::new(
            move || supplier_draft.read().unwrap().clone(),
            sink,
            self.observer.clone(),
        );
        let tracked = Arc::new(StoredRegion {
            draft,
            last_saved: Mutex::new((Vec::new(), String::new())),
            doc_id,
            writer,
        });
        if let Some(id) = tracked.doc_id.lock().unwrap().clone() {
            self.regions.write().unwrap().insert(id, tracked.clone());
        }
        tracked
    }

    fn tracked(&self, key: &str) -> Result<Arc<StoredRegion>> {
        self.regions
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("region {key}")).into())
    }
}

fn region_fields(region: &UserRegion) -> Result<Document> {
    match serde_json::to_value(region)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::Serialization("region is not a JSON object".to_string()).into()),
    }
}

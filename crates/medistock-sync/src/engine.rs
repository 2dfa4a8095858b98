//! # Inventory Sync Engine
//!
//! Owns the in-memory mirror of the remote inventory and keeps it
//! consistent with the document store.
//!
//! ## Engine Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      InventorySyncEngine                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  InventoryState (the mirror)                                     │  │
//! │  │  medicines · aisles · history · error slot · loading flags       │  │
//! │  │  search text · sort option · medicine/history cursors            │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 │ &mut self                            │
//! │         ┌───────────────────────┼───────────────────────┐              │
//! │         ▼                       ▼                       ▼              │
//! │  ┌──────────────┐   ┌──────────────────────┐   ┌─────────────────┐    │
//! │  │ Loads        │   │ Mutations            │   │ Derived views   │    │
//! │  │ eager/paged  │   │ add · stock · edit · │   │ filter + sort   │    │
//! │  │ cursor-based │   │ delete + history     │   │ aisles          │    │
//! │  └──────┬───────┘   └──────────┬───────────┘   └─────────────────┘    │
//! │         │                      │                                        │
//! │         ▼                      ▼                                        │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Arc<dyn RemoteStore>           Arc<dyn InventoryEventEmitter>   │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Slot
//! Only the most recent failure is retained. Every failing operation
//! overwrites the slot and returns the same error. The engine never clears
//! the slot itself; [`InventorySyncEngine::clear_error`] acknowledges it.
//!
//! ## History Writes
//! History entries are appended after the primary write succeeds and are not
//! transactional with it. If the append fails, the slot holds
//! `AddHistoryError` but the primary effect stands and the operation
//! returns `Ok`.

use std::sync::Arc;

use medistock_core::validation::{
    validate_medicine_details, validate_medicine_id, validate_new_medicine, validate_search_query,
};
use medistock_core::view;
use medistock_core::{
    AisleSummary, Actor, HistoryEntry, LoadingStrategy, MedicError, MedicResult, Medicine,
    PageInfo, PageRequest, SortOption, HISTORY_COLLECTION, MEDICINES_COLLECTION,
};
use medistock_store::{
    Cursor, Database, DbConfig, Document, DocumentData, DocumentQuery, MemoryStore, OrderBy,
    RemoteStore, StoreResult,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::InventoryConfig;
use crate::events::{InventoryEvent, InventoryEventEmitter, NoOpEmitter};

// =============================================================================
// State
// =============================================================================

/// Everything the presentation layer observes.
#[derive(Debug, Clone, Default)]
pub struct InventoryState {
    /// Medicines in fetch order (or appended page order).
    pub medicines: Vec<Medicine>,

    /// History of the medicine last passed to `load_history`.
    pub history: Vec<HistoryEntry>,

    /// Sorted distinct aisle labels over the whole medicine mirror.
    pub aisles: Vec<String>,

    /// Most recent failure, if not yet acknowledged.
    pub error: Option<MedicError>,

    pub is_loading: bool,
    pub is_loading_more: bool,

    pub search_text: String,
    pub sort_option: SortOption,

    /// Resume point for the next medicine page. `None` means no more pages.
    pub medicine_cursor: Option<Cursor>,

    /// Resume point for the next history page.
    pub history_cursor: Option<Cursor>,

    /// Medicine the history mirror belongs to.
    pub history_medicine_id: Option<String>,
}

/// Outcome of a stock change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockUpdate {
    /// The change would have made stock negative; nothing was written.
    Unchanged,
    /// The store accepted the new value.
    Applied { previous: i64, current: i64 },
}

/// A fetched batch, already split into the visible page.
struct Batch {
    documents: Vec<Document>,
    cursor: Option<Cursor>,
    has_more: bool,
}

// =============================================================================
// Engine
// =============================================================================

/// The inventory sync engine.
///
/// ## Usage
/// ```rust,no_run
/// use std::sync::Arc;
/// use medistock_core::Actor;
/// use medistock_store::MemoryStore;
/// use medistock_sync::{InventoryConfig, InventorySyncEngine};
///
/// # async fn run() -> medistock_core::MedicResult<()> {
/// let mut engine = InventorySyncEngine::new(Arc::new(MemoryStore::new()), InventoryConfig::default());
/// let actor = Actor::new("uid-1", "nurse@example.com");
///
/// engine.add_medicine("Aspirine", "10", "A1", &actor).await?;
/// engine.load_medicines(false).await?;
/// assert_eq!(engine.aisles(), ["A1"]);
/// # Ok(())
/// # }
/// ```
pub struct InventorySyncEngine {
    store: Arc<dyn RemoteStore>,
    config: InventoryConfig,
    emitter: Arc<dyn InventoryEventEmitter>,
    state: InventoryState,
}

impl InventorySyncEngine {
    pub fn new(store: Arc<dyn RemoteStore>, config: InventoryConfig) -> Self {
        InventorySyncEngine {
            store,
            config,
            emitter: Arc::new(NoOpEmitter),
            state: InventoryState::default(),
        }
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn InventoryEventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    /// Opens the backend named by the store settings and builds an engine on it.
    ///
    /// ## Backends
    /// - `use_emulator = true`: an empty in-memory store
    /// - otherwise: the SQLite database at `database_path`, migrated on open
    pub async fn open(config: InventoryConfig) -> StoreResult<Self> {
        let store: Arc<dyn RemoteStore> = if config.store.use_emulator {
            info!("Using in-memory document store");
            Arc::new(MemoryStore::new())
        } else {
            let db = Database::new(DbConfig::new(&config.store.database_path)).await?;
            Arc::new(db.documents())
        };

        info!(
            backend = store.backend_tag(),
            medicines = %config.medicine_loading(),
            history = %config.history_loading(),
            page_size = config.page_size(),
            "Inventory engine ready"
        );

        Ok(Self::new(store, config))
    }

    // =========================================================================
    // Error Slot
    // =========================================================================

    fn raise(&mut self, err: MedicError) {
        self.state.error = Some(err);
        self.emitter.emit(InventoryEvent::ErrorRaised(err));
    }

    fn fail<T>(&mut self, err: MedicError) -> MedicResult<T> {
        self.raise(err);
        Err(err)
    }

    fn finish_loading(&mut self) {
        self.state.is_loading = false;
        self.state.is_loading_more = false;
    }

    fn start_loading(&mut self, load_more: bool) {
        if load_more {
            self.state.is_loading_more = true;
        } else {
            self.state.is_loading = true;
        }
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    async fn fetch(
        &self,
        collection: &str,
        query: DocumentQuery,
        strategy: LoadingStrategy,
    ) -> StoreResult<Batch> {
        if !strategy.is_paged() {
            debug!(collection = %collection, "Eager fetch");
            let documents = self.store.query(collection, &query).await?;
            return Ok(Batch {
                documents,
                cursor: None,
                has_more: false,
            });
        }

        let request = PageRequest::new(self.config.page_size());
        let query = query.limit(request.fetch_limit());
        debug!(
            collection = %collection,
            limit = request.fetch_limit(),
            resumed = query.start_after.is_some(),
            "Paged fetch"
        );

        let page = request.split(self.store.query(collection, &query).await?);
        let cursor = if page.has_more {
            page.items.last().map(|doc| query.cursor_for(doc))
        } else {
            None
        };

        Ok(Batch {
            documents: page.items,
            cursor,
            has_more: page.has_more,
        })
    }

    /// Base medicine query, with search and sort pushed to the store when
    /// server-side filtering is enabled.
    fn medicine_query(&self) -> DocumentQuery {
        let mut query = DocumentQuery::new();
        if !self.config.server_side_filtering() {
            return query;
        }

        let search = validate_search_query(&self.state.search_text);
        if !search.is_empty() {
            query = query.prefix("name", &search);
        }
        if let Some(field) = self.state.sort_option.field() {
            query = query.order_by(OrderBy::ascending(field));
        }
        query
    }

    /// Loads medicines into the mirror.
    ///
    /// ## Rules
    /// - Eager: one unbounded query, the mirror is replaced
    /// - Paged: `page_size + 1` documents; `load_more` appends after the
    ///   stored cursor, otherwise the mirror is replaced
    /// - `load_more` with no cursor does nothing
    /// - On failure the mirror is untouched and `FetchDataError` is raised
    pub async fn load_medicines(&mut self, load_more: bool) -> MedicResult<PageInfo> {
        let strategy = self.config.medicine_loading();
        let appending = load_more && strategy.is_paged();

        if appending && self.state.medicine_cursor.is_none() {
            debug!("No further medicine pages");
            return Ok(PageInfo::default());
        }

        let mut query = self.medicine_query();
        if appending {
            query = query.start_after(self.state.medicine_cursor.clone());
        }

        self.start_loading(appending);
        let result = self.fetch(MEDICINES_COLLECTION, query, strategy).await;
        self.finish_loading();

        let batch = match result {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, "Failed to fetch medicines");
                return self.fail(MedicError::FetchDataError);
            }
        };

        let medicines: Vec<Medicine> = decode_batch(MEDICINES_COLLECTION, &batch.documents);
        let fetched = medicines.len();

        if appending {
            self.state.medicines.extend(medicines);
        } else {
            self.state.medicines = medicines;
        }
        self.state.medicine_cursor = batch.cursor;
        self.state.aisles = view::aisles_of(&self.state.medicines);
        self.emitter.emit(InventoryEvent::MedicinesChanged);

        debug!(fetched, total = self.state.medicines.len(), has_more = batch.has_more, "Medicines loaded");
        Ok(PageInfo {
            fetched,
            has_more: batch.has_more,
        })
    }

    /// Loads the history of one medicine, newest first.
    ///
    /// A call without `load_more` resets the cursor and replaces the
    /// history mirror. `load_more` for a different medicine, or with no
    /// cursor, does nothing.
    pub async fn load_history(&mut self, medicine: &Medicine, load_more: bool) -> MedicResult<PageInfo> {
        if !medicine.has_id() {
            return self.fail(MedicError::InvalidMedicineId);
        }

        let strategy = self.config.history_loading();
        let appending = load_more && strategy.is_paged();

        if appending {
            let same_medicine = self.state.history_medicine_id.as_deref() == Some(medicine.id.as_str());
            if !same_medicine || self.state.history_cursor.is_none() {
                debug!(medicine_id = %medicine.id, "No further history pages");
                return Ok(PageInfo::default());
            }
        }

        let mut query = DocumentQuery::new()
            .where_eq("medicineId", medicine.id.as_str())
            .order_by(OrderBy::descending("timestamp"));
        if appending {
            query = query.start_after(self.state.history_cursor.clone());
        }

        self.start_loading(appending);
        let result = self.fetch(HISTORY_COLLECTION, query, strategy).await;
        self.finish_loading();

        let batch = match result {
            Ok(batch) => batch,
            Err(err) => {
                warn!(medicine_id = %medicine.id, error = %err, "Failed to fetch history");
                return self.fail(MedicError::FetchHistoryError);
            }
        };

        let entries: Vec<HistoryEntry> = decode_batch(HISTORY_COLLECTION, &batch.documents);
        let fetched = entries.len();

        if appending {
            self.state.history.extend(entries);
        } else {
            self.state.history = entries;
            self.state.history_medicine_id = Some(medicine.id.clone());
        }
        self.state.history_cursor = batch.cursor;
        self.emitter.emit(InventoryEvent::HistoryChanged);

        Ok(PageInfo {
            fetched,
            has_more: batch.has_more,
        })
    }

    /// Fetches one medicine and upserts it into the mirror.
    pub async fn fetch_medicine(&mut self, id: &str) -> MedicResult<Medicine> {
        if let Err(err) = validate_medicine_id(id) {
            return self.fail(err);
        }

        let document = match self.store.get_document(MEDICINES_COLLECTION, id).await {
            Ok(Some(document)) => document,
            Ok(None) => return self.fail(MedicError::MedicineNotFound),
            Err(err) => {
                warn!(medicine_id = %id, error = %err, "Failed to fetch medicine");
                return self.fail(MedicError::FetchDataError);
            }
        };

        let medicine: Medicine = match document.decode() {
            Ok(medicine) => medicine,
            Err(err) => {
                warn!(medicine_id = %id, error = %err, "Undecodable medicine document");
                return self.fail(MedicError::DecodingError);
            }
        };

        match self.state.medicines.iter_mut().find(|m| m.id == medicine.id) {
            Some(existing) => *existing = medicine.clone(),
            None => self.state.medicines.push(medicine.clone()),
        }
        self.state.aisles = view::aisles_of(&self.state.medicines);
        self.emitter.emit(InventoryEvent::MedicinesChanged);

        Ok(medicine)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Appends a history entry. Failure lands in the error slot only.
    async fn record_history(&mut self, medicine_id: &str, actor: &Actor, action: String, details: String) {
        let entry = HistoryEntry::record(medicine_id, actor, action, details);

        let result = match Document::encode(&entry) {
            Ok(data) => self.store.add_document(HISTORY_COLLECTION, data).await.map(|_| ()),
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            warn!(medicine_id = %medicine_id, error = %err, "Failed to append history entry");
            self.raise(MedicError::AddHistoryError);
        }
    }

    /// Adds a medicine under a fresh id and records an "Added" entry.
    ///
    /// The mirror is not updated; the next load picks the medicine up.
    pub async fn add_medicine(
        &mut self,
        name: &str,
        stock_text: &str,
        aisle: &str,
        actor: &Actor,
    ) -> MedicResult<String> {
        let input = match validate_new_medicine(name, stock_text, aisle) {
            Ok(input) => input,
            Err(err) => return self.fail(err),
        };

        let medicine = Medicine::new(input.name, input.stock, input.aisle);
        let result = match Document::encode(&medicine) {
            Ok(data) => self.store.set_document(MEDICINES_COLLECTION, &medicine.id, data).await,
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            warn!(name = %medicine.name, error = %err, "Failed to add medicine");
            return self.fail(MedicError::AddMedicineError);
        }

        info!(medicine_id = %medicine.id, name = %medicine.name, stock = medicine.stock, "Medicine added");
        self.record_history(
            &medicine.id,
            actor,
            format!("Added {}", medicine.name),
            "Added new medicine".to_string(),
        )
        .await;

        Ok(medicine.id)
    }

    /// Changes a medicine's stock by `delta`, optimistically.
    ///
    /// ## Rules
    /// 1. The medicine must carry an id
    /// 2. The starting stock is the mirror entry's, falling back to the
    ///    argument when the medicine is not mirrored
    /// 3. A result below zero writes nothing
    /// 4. The mirror entry is patched before the write and restored if the
    ///    write fails
    /// 5. On success a history entry is appended and the history reloaded
    pub async fn update_stock(&mut self, medicine: &Medicine, delta: i64, actor: &Actor) -> MedicResult<StockUpdate> {
        if !medicine.has_id() {
            return self.fail(MedicError::InvalidMedicineId);
        }

        let previous = self
            .state
            .medicines
            .iter()
            .find(|m| m.id == medicine.id)
            .map_or(medicine.stock, |m| m.stock);
        let current = match previous.checked_add(delta) {
            Some(current) if current >= 0 => current,
            _ => {
                debug!(medicine_id = %medicine.id, stock = previous, delta, "Stock change ignored");
                return Ok(StockUpdate::Unchanged);
            }
        };

        let snapshot = self.patch_stock(&medicine.id, current, true);

        let mut fields = DocumentData::new();
        fields.insert("stock".to_string(), json!(current));

        if let Err(err) = self.store.update_fields(MEDICINES_COLLECTION, &medicine.id, fields).await {
            warn!(medicine_id = %medicine.id, error = %err, "Stock write rejected, rolling back");
            if let Some(stock) = snapshot {
                self.patch_stock(&medicine.id, stock, false);
            }
            return self.fail(MedicError::UpdateStockError);
        }

        if snapshot.is_some() {
            self.emitter.emit(InventoryEvent::StockChanged {
                medicine_id: medicine.id.clone(),
                stock: current,
                optimistic: false,
            });
        }

        let verb = if delta > 0 { "Increased" } else { "Decreased" };
        self.record_history(
            &medicine.id,
            actor,
            format!("{verb} stock of {} by {delta}", medicine.name),
            format!("Stock changed from {previous} to {current}"),
        )
        .await;

        if let Err(err) = self.load_history(medicine, false).await {
            debug!(medicine_id = %medicine.id, error = %err, "History refresh after stock change failed");
        }

        Ok(StockUpdate::Applied { previous, current })
    }

    /// Sets the mirror entry's stock, returning the value it replaced.
    fn patch_stock(&mut self, id: &str, stock: i64, optimistic: bool) -> Option<i64> {
        let entry = self.state.medicines.iter_mut().find(|m| m.id == id)?;
        let replaced = std::mem::replace(&mut entry.stock, stock);

        self.emitter.emit(InventoryEvent::StockChanged {
            medicine_id: id.to_string(),
            stock,
            optimistic,
        });
        Some(replaced)
    }

    /// Renames a medicine and/or moves it to another aisle.
    pub async fn update_medicine_details(
        &mut self,
        medicine: &Medicine,
        name: &str,
        aisle: &str,
        actor: &Actor,
    ) -> MedicResult<()> {
        if !medicine.has_id() {
            return self.fail(MedicError::InvalidMedicineId);
        }
        let (name, aisle) = match validate_medicine_details(name, aisle) {
            Ok(details) => details,
            Err(err) => return self.fail(err),
        };

        let mut fields = DocumentData::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("aisle".to_string(), json!(aisle));

        if let Err(err) = self.store.update_fields(MEDICINES_COLLECTION, &medicine.id, fields).await {
            warn!(medicine_id = %medicine.id, error = %err, "Failed to update medicine details");
            return self.fail(MedicError::UpdateMedicineError);
        }

        if let Some(entry) = self.state.medicines.iter_mut().find(|m| m.id == medicine.id) {
            entry.name = name.clone();
            entry.aisle = aisle.clone();
            self.state.aisles = view::aisles_of(&self.state.medicines);
            self.emitter.emit(InventoryEvent::MedicinesChanged);
        }

        self.record_history(
            &medicine.id,
            actor,
            format!("Updated {name}"),
            format!(
                "Name changed from {} to {}, aisle changed from {} to {}",
                medicine.name, name, medicine.aisle, aisle
            ),
        )
        .await;

        Ok(())
    }

    /// Deletes a medicine and records a "Deleted" entry.
    ///
    /// The mirror is not pruned; the next load is the source of truth.
    pub async fn delete_medicine(&mut self, medicine: &Medicine, actor: &Actor) -> MedicResult<()> {
        if !medicine.has_id() {
            return self.fail(MedicError::InvalidMedicineId);
        }

        if let Err(err) = self.store.delete_document(MEDICINES_COLLECTION, &medicine.id).await {
            warn!(medicine_id = %medicine.id, error = %err, "Failed to delete medicine");
            return self.fail(MedicError::DeleteMedicineError);
        }

        info!(medicine_id = %medicine.id, name = %medicine.name, "Medicine deleted");
        self.record_history(
            &medicine.id,
            actor,
            format!("Deleted {}", medicine.name),
            "Medicine removed from inventory".to_string(),
        )
        .await;

        Ok(())
    }

    // =========================================================================
    // Derived Views
    // =========================================================================

    /// The list screen's medicines. The search text is matched as typed.
    /// With server-side filtering the store already applied search and sort,
    /// so the mirror is returned as-is.
    pub fn filtered_and_sorted_medicines(&self) -> Vec<Medicine> {
        if self.config.server_side_filtering() {
            return self.state.medicines.clone();
        }
        view::filter_and_sort(&self.state.medicines, &self.state.search_text, self.state.sort_option)
    }

    /// Looks a medicine up in the mirror.
    pub fn medicine(&self, id: &str) -> MedicResult<&Medicine> {
        self.state
            .medicines
            .iter()
            .find(|m| m.id == id)
            .ok_or(MedicError::MedicineNotFound)
    }

    pub fn medicines_in_aisle(&self, aisle: &str) -> Vec<Medicine> {
        view::medicines_in_aisle(&self.state.medicines, aisle)
    }

    pub fn aisle_summaries(&self) -> Vec<AisleSummary> {
        view::aisle_summaries(&self.state.medicines)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &InventoryState {
        &self.state
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn medicines(&self) -> &[Medicine] {
        &self.state.medicines
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn aisles(&self) -> &[String] {
        &self.state.aisles
    }

    pub fn error(&self) -> Option<MedicError> {
        self.state.error
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.state.is_loading_more
    }

    pub fn has_more_medicines(&self) -> bool {
        self.state.medicine_cursor.is_some()
    }

    pub fn has_more_history(&self) -> bool {
        self.state.history_cursor.is_some()
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.state.search_text = text.into();
    }

    pub fn set_sort_option(&mut self, sort: SortOption) {
        self.state.sort_option = sort;
    }
}

/// Decodes a batch, dropping documents that do not fit the type.
fn decode_batch<T: DeserializeOwned>(collection: &str, documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|document| match document.decode::<T>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(collection = %collection, id = %document.id, error = %err, "Dropping undecodable document");
                None
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use medistock_store::StoreOp;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingEmitter {
        events: Mutex<Vec<InventoryEvent>>,
    }

    impl RecordingEmitter {
        fn take(&self) -> Vec<InventoryEvent> {
            std::mem::take(&mut *self.events.lock().unwrap())
        }
    }

    impl InventoryEventEmitter for RecordingEmitter {
        fn emit(&self, event: InventoryEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn actor() -> Actor {
        Actor::new("uid-1", "nurse@example.com")
    }

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    async fn seed_medicine(store: &MemoryStore, id: &str, name: &str, stock: i64, aisle: &str) {
        store
            .seed(
                MEDICINES_COLLECTION,
                id,
                data(json!({ "name": name, "stock": stock, "aisle": aisle })),
            )
            .await;
    }

    fn engine(store: &Arc<MemoryStore>, config: InventoryConfig) -> InventorySyncEngine {
        InventorySyncEngine::new(store.clone(), config)
    }

    #[tokio::test]
    async fn test_eager_load_replaces_mirror_and_aisles() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "B1").await;
        seed_medicine(&store, "m2", "Doliprane", 5, "A1").await;
        seed_medicine(&store, "m3", "Ibuprofène", 0, "B1").await;

        let mut engine = engine(&store, InventoryConfig::default());
        let info = engine.load_medicines(false).await.unwrap();

        assert_eq!(info, PageInfo { fetched: 3, has_more: false });
        assert_eq!(engine.aisles(), ["A1", "B1"]);
        assert_eq!(engine.medicines_in_aisle("B1").len(), 2);
        assert!(!engine.is_loading());
    }

    #[tokio::test]
    async fn test_undecodable_documents_are_dropped() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "A1").await;
        store
            .seed(MEDICINES_COLLECTION, "broken", data(json!({ "name": "No stock" })))
            .await;

        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        assert_eq!(engine.medicines().len(), 1);
        assert_eq!(engine.error(), None);
    }

    #[tokio::test]
    async fn test_negative_stock_never_reaches_mirror() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", -3, "A1").await;
        seed_medicine(&store, "m2", "Doliprane", 4, "B1").await;
        let mut engine = engine(&store, InventoryConfig::default());

        engine.load_medicines(false).await.unwrap();
        let stocks: Vec<_> = engine.medicines().iter().map(|m| m.stock).collect();
        assert_eq!(stocks, [4]);
        assert_eq!(engine.aisles(), ["B1"]);

        assert_eq!(engine.fetch_medicine("m1").await, Err(MedicError::DecodingError));
        assert!(engine.medicine("m1").is_err());
    }

    #[tokio::test]
    async fn test_client_side_search_uses_text_as_typed() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 1, "A1").await;
        seed_medicine(&store, "m2", "Vitamine C", 1, "A1").await;
        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        engine.set_search_text("asp");
        assert_eq!(engine.filtered_and_sorted_medicines().len(), 1);

        engine.set_search_text("ine ");
        let names: Vec<_> = engine
            .filtered_and_sorted_medicines()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Vitamine C"]);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_mirror() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "A1").await;

        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        store.fail(StoreOp::Query);
        assert_eq!(engine.load_medicines(false).await, Err(MedicError::FetchDataError));
        assert_eq!(engine.medicines().len(), 1);
        assert_eq!(engine.error(), Some(MedicError::FetchDataError));
        assert!(!engine.is_loading());
        assert!(!engine.is_loading_more());
        assert_eq!(store.calls(StoreOp::Query), 2);
    }

    #[tokio::test]
    async fn test_paged_load_over_fetches_by_one() {
        let store = Arc::new(MemoryStore::new());
        for (id, name) in [("m1", "Aspirine"), ("m2", "Doliprane"), ("m3", "Ibuprofène")] {
            seed_medicine(&store, id, name, 1, "A1").await;
        }
        let config = InventoryConfig::default()
            .with_medicine_loading(LoadingStrategy::Paged)
            .with_page_size(2);
        let mut engine = engine(&store, config);

        let first = engine.load_medicines(false).await.unwrap();
        assert_eq!(first, PageInfo { fetched: 2, has_more: true });
        assert!(engine.has_more_medicines());

        let second = engine.load_medicines(true).await.unwrap();
        assert_eq!(second, PageInfo { fetched: 1, has_more: false });
        assert!(!engine.has_more_medicines());
        assert_eq!(engine.medicines().len(), 3);

        let before = store.calls(StoreOp::Query);
        assert_eq!(engine.load_medicines(true).await.unwrap(), PageInfo::default());
        assert_eq!(store.calls(StoreOp::Query), before);
    }

    #[tokio::test]
    async fn test_server_side_filtering_pushes_prefix_and_order() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 30, "A1").await;
        seed_medicine(&store, "m2", "Asmanex", 10, "A1").await;
        seed_medicine(&store, "m3", "Paracétamol", 20, "B1").await;

        let config = InventoryConfig::default().with_server_side_filtering(true);
        let mut engine = engine(&store, config);
        engine.set_search_text("As");
        engine.set_sort_option(SortOption::Stock);
        engine.load_medicines(false).await.unwrap();

        let names: Vec<_> = engine
            .filtered_and_sorted_medicines()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Asmanex", "Aspirine"]);
    }

    #[tokio::test]
    async fn test_client_side_view_is_stable() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 20, "A1").await;
        seed_medicine(&store, "m2", "Paracétamol", 10, "A1").await;
        seed_medicine(&store, "m3", "Doliprane", 15, "A1").await;

        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();
        engine.set_sort_option(SortOption::Stock);

        let first = engine.filtered_and_sorted_medicines();
        let stocks: Vec<_> = first.iter().map(|m| m.stock).collect();
        assert_eq!(stocks, [10, 15, 20]);
        assert_eq!(engine.filtered_and_sorted_medicines(), first);
    }

    #[tokio::test]
    async fn test_add_medicine_writes_medicine_and_history() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(&store, InventoryConfig::default());

        let id = engine.add_medicine("  Aspirine ", "10", "A1", &actor()).await.unwrap();

        let stored = store.peek(MEDICINES_COLLECTION, &id).await.unwrap();
        assert_eq!(stored["name"], "Aspirine");
        assert_eq!(stored["stock"], 10);
        assert!(!stored.contains_key("id"));
        assert_eq!(store.len(HISTORY_COLLECTION).await, 1);
        assert!(engine.medicines().is_empty());
        assert_eq!(engine.error(), None);
    }

    #[tokio::test]
    async fn test_add_medicine_validation_skips_store() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(&store, InventoryConfig::default());

        let cases = [
            ("", "10", "A1", MedicError::InvalidMedicineName),
            ("Aspirine", "ten", "A1", MedicError::InvalidStock),
            ("Aspirine", "-1", "A1", MedicError::InvalidStock),
            ("Aspirine", "10", " ", MedicError::InvalidAisle),
        ];
        for (name, stock, aisle, expected) in cases {
            assert_eq!(engine.add_medicine(name, stock, aisle, &actor()).await, Err(expected));
            assert_eq!(engine.error(), Some(expected));
        }
        assert_eq!(store.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_add_medicine_write_failure() {
        let store = Arc::new(MemoryStore::new());
        store.fail(StoreOp::SetDocument);
        let mut engine = engine(&store, InventoryConfig::default());

        assert_eq!(
            engine.add_medicine("Aspirine", "10", "A1", &actor()).await,
            Err(MedicError::AddMedicineError)
        );
        assert_eq!(store.calls(StoreOp::AddDocument), 0);
    }

    #[tokio::test]
    async fn test_history_failure_keeps_primary_effect() {
        let store = Arc::new(MemoryStore::new());
        store.fail(StoreOp::AddDocument);
        let mut engine = engine(&store, InventoryConfig::default());

        let id = engine.add_medicine("Aspirine", "10", "A1", &actor()).await.unwrap();
        assert!(store.peek(MEDICINES_COLLECTION, &id).await.is_some());
        assert_eq!(engine.error(), Some(MedicError::AddHistoryError));
    }

    #[tokio::test]
    async fn test_update_stock_negative_is_noop() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 0, "A1").await;
        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        let medicine = engine.medicine("m1").unwrap().clone();
        let outcome = engine.update_stock(&medicine, -1, &actor()).await.unwrap();

        assert_eq!(outcome, StockUpdate::Unchanged);
        assert_eq!(store.write_calls(), 0);
        assert_eq!(engine.medicine("m1").unwrap().stock, 0);
        assert_eq!(engine.error(), None);
    }

    #[tokio::test]
    async fn test_update_stock_requires_id() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(&store, InventoryConfig::default());
        let mut medicine = Medicine::new("Aspirine", 1, "A1");
        medicine.id.clear();

        assert_eq!(
            engine.update_stock(&medicine, 1, &actor()).await,
            Err(MedicError::InvalidMedicineId)
        );
        assert_eq!(store.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_stock_optimistic_then_confirmed() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "A1").await;
        let emitter = Arc::new(RecordingEmitter::default());
        let mut engine = engine(&store, InventoryConfig::default()).with_emitter(emitter.clone());
        engine.load_medicines(false).await.unwrap();
        emitter.take();

        let medicine = engine.medicine("m1").unwrap().clone();
        let outcome = engine.update_stock(&medicine, 1, &actor()).await.unwrap();

        assert_eq!(outcome, StockUpdate::Applied { previous: 10, current: 11 });
        assert_eq!(engine.medicine("m1").unwrap().stock, 11);

        let events = emitter.take();
        assert_eq!(
            events[0],
            InventoryEvent::StockChanged {
                medicine_id: "m1".into(),
                stock: 11,
                optimistic: true
            }
        );
        assert!(events.contains(&InventoryEvent::HistoryChanged));

        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.history()[0].action, "Increased stock of Aspirine by 1");
        assert_eq!(engine.history()[0].details, "Stock changed from 10 to 11");
    }

    #[tokio::test]
    async fn test_update_stock_rollback_on_failure() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "A1").await;
        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        store.fail(StoreOp::UpdateFields);
        let medicine = engine.medicine("m1").unwrap().clone();

        assert_eq!(
            engine.update_stock(&medicine, 5, &actor()).await,
            Err(MedicError::UpdateStockError)
        );
        assert_eq!(engine.medicine("m1").unwrap().stock, 10);
        assert_eq!(engine.error(), Some(MedicError::UpdateStockError));
        assert_eq!(store.calls(StoreOp::AddDocument), 0);
    }

    #[tokio::test]
    async fn test_zero_delta_goes_through_write_path() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 5, "A1").await;
        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();
        let medicine = engine.medicine("m1").unwrap().clone();

        store.fail(StoreOp::UpdateFields);
        assert_eq!(
            engine.update_stock(&medicine, 0, &actor()).await,
            Err(MedicError::UpdateStockError)
        );
        assert_eq!(engine.error(), Some(MedicError::UpdateStockError));
        assert_eq!(engine.medicine("m1").unwrap().stock, 5);
        assert_eq!(store.calls(StoreOp::UpdateFields), 1);

        store.recover(StoreOp::UpdateFields);
        let outcome = engine.update_stock(&medicine, 0, &actor()).await.unwrap();
        assert_eq!(outcome, StockUpdate::Applied { previous: 5, current: 5 });
        assert_eq!(store.len(HISTORY_COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn test_update_stock_starts_from_mirror_value() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "A1").await;
        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        let stale = engine.medicine("m1").unwrap().clone();
        engine.update_stock(&stale, 1, &actor()).await.unwrap();

        let outcome = engine.update_stock(&stale, 1, &actor()).await.unwrap();
        assert_eq!(outcome, StockUpdate::Applied { previous: 11, current: 12 });
        assert_eq!(store.peek(MEDICINES_COLLECTION, "m1").await.unwrap()["stock"], 12);
        assert_eq!(engine.history()[0].details, "Stock changed from 11 to 12");

        let mut unmirrored = stale.clone();
        unmirrored.id = "m2".into();
        unmirrored.stock = 3;
        store.fail(StoreOp::UpdateFields);
        let _ = engine.update_stock(&unmirrored, -3, &actor()).await;
        assert_eq!(engine.error(), Some(MedicError::UpdateStockError));
    }

    #[tokio::test]
    async fn test_update_details_patches_mirror() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "A1").await;
        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        let medicine = engine.medicine("m1").unwrap().clone();
        engine
            .update_medicine_details(&medicine, "Aspirine 500", "C3", &actor())
            .await
            .unwrap();

        assert_eq!(engine.medicine("m1").unwrap().name, "Aspirine 500");
        assert_eq!(engine.aisles(), ["C3"]);
        let stored = store.peek(MEDICINES_COLLECTION, "m1").await.unwrap();
        assert_eq!(stored["aisle"], "C3");
        assert_eq!(stored["stock"], 10);

        assert_eq!(
            engine.update_medicine_details(&medicine, "", "C3", &actor()).await,
            Err(MedicError::InvalidMedicineName)
        );
    }

    #[tokio::test]
    async fn test_update_details_missing_document() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(&store, InventoryConfig::default());
        let medicine = Medicine::new("Ghost", 1, "A1");

        assert_eq!(
            engine.update_medicine_details(&medicine, "Ghost", "A2", &actor()).await,
            Err(MedicError::UpdateMedicineError)
        );
    }

    #[tokio::test]
    async fn test_delete_keeps_mirror_until_reload() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 0, "A1").await;
        let mut engine = engine(&store, InventoryConfig::default());
        engine.load_medicines(false).await.unwrap();

        let medicine = engine.medicine("m1").unwrap().clone();
        engine.delete_medicine(&medicine, &actor()).await.unwrap();
        assert_eq!(engine.medicines().len(), 1);
        assert!(store.peek(MEDICINES_COLLECTION, "m1").await.is_none());

        engine.load_medicines(false).await.unwrap();
        assert!(engine.medicines().is_empty());

        engine.load_history(&medicine, false).await.unwrap();
        assert_eq!(engine.history()[0].action, "Deleted Aspirine");
    }

    #[tokio::test]
    async fn test_delete_failure() {
        let store = Arc::new(MemoryStore::new());
        store.fail(StoreOp::DeleteDocument);
        let mut engine = engine(&store, InventoryConfig::default());
        let medicine = Medicine::new("Aspirine", 0, "A1");

        assert_eq!(
            engine.delete_medicine(&medicine, &actor()).await,
            Err(MedicError::DeleteMedicineError)
        );
        assert_eq!(store.calls(StoreOp::AddDocument), 0);
    }

    #[tokio::test]
    async fn test_history_paging_and_scope() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..3i64 {
            store
                .seed(
                    HISTORY_COLLECTION,
                    &format!("h{i}"),
                    data(json!({
                        "medicineId": "m1",
                        "userId": "uid-1",
                        "user": "nurse@example.com",
                        "action": format!("entry {i}"),
                        "details": "",
                        "timestamp": 1_700_000_000_000_000i64 + i,
                    })),
                )
                .await;
        }
        store
            .seed(
                HISTORY_COLLECTION,
                "other",
                data(json!({
                    "medicineId": "m2",
                    "userId": "uid-1",
                    "user": "nurse@example.com",
                    "action": "other",
                    "details": "",
                    "timestamp": 1_700_000_000_000_100i64,
                })),
            )
            .await;

        let config = InventoryConfig::default()
            .with_history_loading(LoadingStrategy::Paged)
            .with_page_size(2);
        let mut engine = engine(&store, config);
        let medicine = Medicine {
            id: "m1".into(),
            name: "Aspirine".into(),
            stock: 1,
            aisle: "A1".into(),
        };

        let first = engine.load_history(&medicine, false).await.unwrap();
        assert!(first.has_more);
        let actions: Vec<_> = engine.history().iter().map(|h| h.action.as_str()).collect();
        assert_eq!(actions, ["entry 2", "entry 1"]);

        let second = engine.load_history(&medicine, true).await.unwrap();
        assert_eq!(second, PageInfo { fetched: 1, has_more: false });
        assert_eq!(engine.history().last().unwrap().action, "entry 0");
        assert_eq!(engine.history()[0].id, "h2");
    }

    #[tokio::test]
    async fn test_history_failure_keeps_mirror() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(&store, InventoryConfig::default());
        let medicine = Medicine::new("Aspirine", 1, "A1");
        engine.add_medicine("Aspirine", "1", "A1", &actor()).await.unwrap();

        store.fail(StoreOp::Query);
        assert_eq!(
            engine.load_history(&medicine, false).await,
            Err(MedicError::FetchHistoryError)
        );
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_medicine() {
        let store = Arc::new(MemoryStore::new());
        seed_medicine(&store, "m1", "Aspirine", 10, "A1").await;
        store
            .seed(MEDICINES_COLLECTION, "bad", data(json!({ "stock": "many" })))
            .await;
        let mut engine = engine(&store, InventoryConfig::default());

        let fetched = engine.fetch_medicine("m1").await.unwrap();
        assert_eq!(fetched.name, "Aspirine");
        assert_eq!(engine.medicine("m1").unwrap().stock, 10);

        assert_eq!(engine.fetch_medicine("nope").await, Err(MedicError::MedicineNotFound));
        assert_eq!(engine.fetch_medicine("bad").await, Err(MedicError::DecodingError));
        assert_eq!(engine.fetch_medicine(" ").await, Err(MedicError::InvalidMedicineId));

        store.fail(StoreOp::GetDocument);
        assert_eq!(engine.fetch_medicine("m1").await, Err(MedicError::FetchDataError));
    }

    #[tokio::test]
    async fn test_error_slot_overwrites_until_cleared() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(&store, InventoryConfig::default());

        let _ = engine.add_medicine("", "1", "A1", &actor()).await;
        let _ = engine.add_medicine("Aspirine", "x", "A1", &actor()).await;
        assert_eq!(engine.error(), Some(MedicError::InvalidStock));

        engine.add_medicine("Aspirine", "1", "A1", &actor()).await.unwrap();
        assert_eq!(engine.error(), Some(MedicError::InvalidStock));

        engine.clear_error();
        assert_eq!(engine.error(), None);
        assert_eq!(engine.medicine("missing"), Err(MedicError::MedicineNotFound));
    }

    #[tokio::test]
    async fn test_open_emulator_backend() {
        let config = InventoryConfig {
            store: crate::config::StoreSettings {
                use_emulator: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut engine = InventorySyncEngine::open(config).await.unwrap();

        assert_eq!(engine.load_medicines(false).await.unwrap(), PageInfo::default());
    }
}

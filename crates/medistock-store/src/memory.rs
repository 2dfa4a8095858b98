//! # In-Memory Document Store
//!
//! A [`RemoteStore`] held entirely in process memory. Used as the emulator
//! backend and as the test double for the sync engine.
//!
//! ## Test Hooks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  store.fail(StoreOp::UpdateFields)   next update_fields calls fail     │
//! │  store.recover(StoreOp::UpdateFields)                                  │
//! │  store.calls(StoreOp::SetDocument)   how many times it was attempted   │
//! │  store.write_calls()                 set + add + update + delete       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Calls are counted before the failure check, so a failed attempt still
//! shows up in the counters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::document::{Document, DocumentData, DocumentQuery};
use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteStore;

/// Store operations that can be counted or made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Query,
    GetAll,
    GetDocument,
    SetDocument,
    AddDocument,
    UpdateFields,
    DeleteDocument,
}

impl StoreOp {
    pub const ALL: [StoreOp; 7] = [
        StoreOp::Query,
        StoreOp::GetAll,
        StoreOp::GetDocument,
        StoreOp::SetDocument,
        StoreOp::AddDocument,
        StoreOp::UpdateFields,
        StoreOp::DeleteDocument,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn is_write(self) -> bool {
        matches!(
            self,
            StoreOp::SetDocument | StoreOp::AddDocument | StoreOp::UpdateFields | StoreOp::DeleteDocument
        )
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::Query => "query",
            StoreOp::GetAll => "get_all",
            StoreOp::GetDocument => "get_document",
            StoreOp::SetDocument => "set_document",
            StoreOp::AddDocument => "add_document",
            StoreOp::UpdateFields => "update_fields",
            StoreOp::DeleteDocument => "delete_document",
        };
        f.write_str(name)
    }
}

type Collections = BTreeMap<String, BTreeMap<String, DocumentData>>;

/// In-memory document store with failure injection and call counting.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    failures: [AtomicBool; 7],
    calls: [AtomicU64; 7],
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of `op` fail with `StoreError::Unavailable`.
    pub fn fail(&self, op: StoreOp) {
        self.failures[op.index()].store(true, Ordering::SeqCst);
    }

    pub fn recover(&self, op: StoreOp) {
        self.failures[op.index()].store(false, Ordering::SeqCst);
    }

    /// Simulates a full outage.
    pub fn fail_all(&self) {
        for op in StoreOp::ALL {
            self.fail(op);
        }
    }

    pub fn recover_all(&self) {
        for op in StoreOp::ALL {
            self.recover(op);
        }
    }

    /// Number of times `op` was attempted.
    pub fn calls(&self, op: StoreOp) -> u64 {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Total write attempts of any kind.
    pub fn write_calls(&self) -> u64 {
        StoreOp::ALL
            .into_iter()
            .filter(|op| op.is_write())
            .map(|op| self.calls(op))
            .sum()
    }

    pub fn reset_calls(&self) {
        for counter in &self.calls {
            counter.store(0, Ordering::SeqCst);
        }
    }

    /// Writes a raw document, bypassing counters and failure injection.
    pub async fn seed(&self, collection: &str, id: &str, data: DocumentData) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
    }

    /// Reads a raw document, bypassing counters and failure injection.
    pub async fn peek(&self, collection: &str, id: &str) -> Option<DocumentData> {
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Number of documents in a collection.
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }

    fn enter(&self, op: StoreOp, collection: &str) -> StoreResult<()> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        debug!(op = %op, collection = %collection, "memory store call");

        if self.failures[op.index()].load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("{op} failure injected")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>> {
        self.enter(StoreOp::Query, collection)?;

        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .into_iter()
            .flatten()
            .map(|(id, data)| Document::new(id.clone(), data.clone()));

        Ok(query.apply(documents))
    }

    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.enter(StoreOp::GetAll, collection)?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .into_iter()
            .flatten()
            .map(|(id, data)| Document::new(id.clone(), data.clone()))
            .collect())
    }

    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.enter(StoreOp::GetDocument, collection)?;

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document::new(id, data.clone())))
    }

    async fn set_document(&self, collection: &str, id: &str, data: DocumentData) -> StoreResult<()> {
        self.enter(StoreOp::SetDocument, collection)?;

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn add_document(&self, collection: &str, data: DocumentData) -> StoreResult<String> {
        self.enter(StoreOp::AddDocument, collection)?;

        let id = Uuid::new_v4().to_string();
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn update_fields(&self, collection: &str, id: &str, fields: DocumentData) -> StoreResult<()> {
        self.enter(StoreOp::UpdateFields, collection)?;

        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;

        existing.extend(fields);
        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.enter(StoreOp::DeleteDocument, collection)?;

        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

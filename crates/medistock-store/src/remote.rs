//! # RemoteStore Contract
//!
//! The narrow async interface the sync engine uses to reach the document
//! store. Backends: [`SqliteDocumentStore`] (local SQLite) and
//! [`MemoryStore`] (in-process emulator and test double).
//!
//! ## Operation Table
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ Operation        │ Semantics                                            │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ query            │ filters, order, limit, start_after (see document.rs) │
//! │ get_all          │ every document, id ascending                         │
//! │ get_document     │ Ok(None) if absent                                   │
//! │ set_document     │ create or replace under a client-chosen id           │
//! │ add_document     │ create under a store-assigned id, returns it         │
//! │ update_fields    │ merge top-level fields, NotFound if absent           │
//! │ delete_document  │ remove; deleting an absent id is not an error        │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```
//!
//! [`SqliteDocumentStore`]: crate::repository::documents::SqliteDocumentStore
//! [`MemoryStore`]: crate::memory::MemoryStore

use async_trait::async_trait;

use crate::document::{Document, DocumentData, DocumentQuery};
use crate::error::StoreResult;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_tag(&self) -> &'static str;

    async fn query(&self, collection: &str, query: &DocumentQuery) -> StoreResult<Vec<Document>>;

    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.query(collection, &DocumentQuery::new()).await
    }

    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    async fn set_document(&self, collection: &str, id: &str, data: DocumentData) -> StoreResult<()>;

    async fn add_document(&self, collection: &str, data: DocumentData) -> StoreResult<String>;

    async fn update_fields(&self, collection: &str, id: &str, fields: DocumentData) -> StoreResult<()>;

    async fn delete_document(&self, collection: &str, id: &str) -> StoreResult<()>;
}

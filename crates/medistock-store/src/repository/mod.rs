//! # Repository Module
//!
//! SQLite-backed repositories for MediStock.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  InventorySyncEngine                                                   │
//! │       │                                                                 │
//! │       │  store.query("medicines", &query)                              │
//! │       ▼                                                                 │
//! │  dyn RemoteStore                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteDocumentStore                                                   │
//! │  ├── query(&self, collection, query)                                   │
//! │  ├── get_document(&self, collection, id)                               │
//! │  ├── set_document / add_document                                       │
//! │  └── update_fields / delete_document                                   │
//! │       │                                                                 │
//! │       │  SQL (json_extract over one table)                             │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`SqliteDocumentStore`](documents::SqliteDocumentStore) - Schema-less documents

pub mod documents;

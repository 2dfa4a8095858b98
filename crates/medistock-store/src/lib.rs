//! # medistock-store: Document Store and Identity Provider Layer
//!
//! This crate provides the external collaborators the MediStock engine
//! talks to: a document store and an identity provider, each behind a
//! narrow async trait.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MediStock Data Flow                              │
//! │                                                                         │
//! │  InventorySyncEngine / SessionGateway (medistock-sync)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  medistock-store (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  RemoteStore  │    │   Backends    │    │ AuthProvider │  │   │
//! │  │   │  (remote.rs)  │◄───│ SqliteDocument│    │  (auth.rs)   │  │   │
//! │  │   │               │    │ MemoryStore   │    │ LocalAuth    │  │   │
//! │  │   │ DocumentQuery │    │               │    │ argon2 + JWT │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                                   ▼                                     │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │       SQLite database: documents(collection, id, data JSON)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`document`] - Documents, queries, value ordering
//! - [`remote`] - The `RemoteStore` trait
//! - [`memory`] - In-memory backend with failure injection
//! - [`pool`] - Opening and migrating the SQLite database
//! - [`repository`] - SQLite document store
//! - [`auth`] - `AuthProvider` trait and local provider
//! - [`token`] - JWT id tokens
//! - [`error`] - Store and identity provider errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medistock_store::{Database, DbConfig, RemoteStore};
//!
//! let db = Database::new(DbConfig::new("medistock.db")).await?;
//! let store = db.documents();
//! let medicines = store.get_all("medicines").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod document;
pub mod error;
pub mod memory;
pub mod pool;
pub mod remote;
pub mod repository;
pub mod token;

// =============================================================================
// Re-exports
// =============================================================================

pub use auth::{AuthProvider, AuthUser, LocalAuthProvider};
pub use document::{Cursor, Direction, Document, DocumentData, DocumentQuery, Filter, OrderBy};
pub use error::{AuthProviderError, AuthResult, StoreError, StoreResult};
pub use memory::{MemoryStore, StoreOp};
pub use pool::{Database, DbConfig};
pub use remote::RemoteStore;
pub use repository::documents::SqliteDocumentStore;
pub use token::TokenIssuer;

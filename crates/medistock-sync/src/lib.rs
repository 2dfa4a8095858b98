//! # medistock-sync: Inventory Sync Engine for MediStock
//!
//! This crate keeps an in-memory mirror of the remote inventory consistent
//! with the document store, and manages the user session.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Layer Architecture                          │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 InventorySyncEngine (the core)                   │  │
//! │  │                                                                  │  │
//! │  │  Mirror of medicines, aisles and history                        │  │
//! │  │  Eager or paged loads · optimistic stock · audit history        │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ SessionGateway │  │InventoryConfig │  │ InventoryEventEmitter  │    │
//! │  │                │  │                │  │                        │    │
//! │  │ Sign up/in/out │  │ TOML + env     │  │ Mirror change events   │    │
//! │  │ Error mapping  │  │ Loading, paging│  │ for the presentation   │    │
//! │  │                │  │ Backend choice │  │ layer                  │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  COLLABORATORS (medistock-store):                                      │
//! │  • RemoteStore  - SQLite documents or the in-memory emulator           │
//! │  • AuthProvider - local identity provider                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`engine`] - `InventorySyncEngine` and its observable state
//! - [`session`] - `SessionGateway`
//! - [`config`] - Engine configuration (loading strategy, page size, store)
//! - [`events`] - Change notifications
//! - [`error`] - Configuration errors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use medistock_store::LocalAuthProvider;
//! use medistock_sync::{InventoryConfig, InventorySyncEngine, SessionGateway};
//!
//! let config = InventoryConfig::load_or_default(None);
//! let mut engine = InventorySyncEngine::open(config).await?;
//! let mut session = SessionGateway::new(Arc::new(LocalAuthProvider::default()));
//!
//! let user = session.sign_in("nurse@example.com", "Medistock#2025").await?;
//! engine.load_medicines(false).await?;
//! let id = engine.add_medicine("Aspirine", "10", "A1", &user.actor()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{InventoryConfig, LoadingSettings, QuerySettings, StoreSettings};
pub use engine::{InventoryState, InventorySyncEngine, StockUpdate};
pub use error::{ConfigError, ConfigResult};
pub use events::{InventoryEvent, InventoryEventEmitter, NoOpEmitter};
pub use session::{Session, SessionGateway};

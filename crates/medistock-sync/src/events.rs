//! # Inventory Events
//!
//! Notifications the engine sends after each mirror mutation, so an
//! embedding UI can re-render without polling.
//!
//! ## Event Timeline for a Stock Change
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  update_stock(m, +1)                                                   │
//! │       │                                                                 │
//! │       ├── StockChanged { stock: 11, optimistic: true }   mirror patched │
//! │       │                                                                 │
//! │       ▼  store.update_fields(...)                                      │
//! │       │                                                                 │
//! │  ok ──┼── StockChanged { stock: 11, optimistic: false }  confirmed      │
//! │       └── HistoryChanged                                 history reload │
//! │                                                                         │
//! │  err ─┼── StockChanged { stock: 10, optimistic: false }  rolled back    │
//! │       └── ErrorRaised(UpdateStockError)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use medistock_core::MedicError;

/// Something in the engine state changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// The medicine mirror (or the aisle list) changed.
    MedicinesChanged,

    /// One medicine's stock changed in the mirror.
    StockChanged {
        medicine_id: String,
        stock: i64,
        /// True while the store write is still in flight.
        optimistic: bool,
    },

    /// The history mirror changed.
    HistoryChanged,

    /// The error slot was set.
    ErrorRaised(MedicError),
}

/// Trait for receiving engine events (implemented by the presentation layer).
pub trait InventoryEventEmitter: Send + Sync {
    fn emit(&self, event: InventoryEvent);
}

/// No-op event emitter for headless use and tests.
pub struct NoOpEmitter;

impl InventoryEventEmitter for NoOpEmitter {
    fn emit(&self, _event: InventoryEvent) {}
}

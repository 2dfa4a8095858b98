//! # medistock-core: Pure Domain Logic for MediStock
//!
//! This crate holds the domain model of the medical-inventory client as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MediStock Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Presentation layer (screens)                    │   │
//! │  │    Login ──► Aisles ──► Medicine list ──► Detail + history      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        medistock-sync (InventorySyncEngine, SessionGateway)     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ medistock-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   view    │  │pagination │  │ validation│  │   │
//! │  │   │ Medicine  │  │ filter +  │  │ over-fetch│  │   rules   │  │   │
//! │  │   │ History   │  │ sort      │  │ by one    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORE • NO NETWORK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        medistock-store (document store + auth provider)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Medicine, HistoryEntry, Actor, SortOption)
//! - [`error`] - The `MedicError` taxonomy
//! - [`validation`] - Form and credential validation
//! - [`view`] - Derived, filtered and sorted views
//! - [`pagination`] - Page splitting
//!
//! ## Example Usage
//!
//! ```rust
//! use medistock_core::view::filter_and_sort;
//! use medistock_core::{Medicine, SortOption};
//!
//! let medicines = vec![
//!     Medicine::new("Aspirine", 20, "A1"),
//!     Medicine::new("Ibuprofène", 15, "C1"),
//! ];
//! let by_stock = filter_and_sort(&medicines, "", SortOption::Stock);
//! assert_eq!(by_stock[0].name, "Ibuprofène");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{MedicError, MedicResult};
pub use pagination::{Page, PageInfo, PageRequest};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Document store collection holding medicines.
pub const MEDICINES_COLLECTION: &str = "medicines";

/// Document store collection holding history entries.
pub const HISTORY_COLLECTION: &str = "history";

/// Default page size for paged loading.
pub const DEFAULT_PAGE_SIZE: usize = 20;

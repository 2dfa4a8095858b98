//! # Domain Types
//!
//! Core domain types used throughout MediStock.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Medicine     │   │  HistoryEntry   │   │     Actor       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID v4)   │◄──│  medicine_id    │   │  id (uid)       │       │
//! │  │  name           │   │  user_id, user  │   │  name (email)   │       │
//! │  │  stock (>= 0)   │   │  action         │   └─────────────────┘       │
//! │  │  aisle (label)  │   │  details        │                             │
//! │  └─────────────────┘   │  timestamp      │   ┌─────────────────┐       │
//! │                        └─────────────────┘   │   SortOption    │       │
//! │  ┌─────────────────┐                         │  None/Name/Stock│       │
//! │  │  AisleSummary   │                         └─────────────────┘       │
//! │  │  aisle + count  │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Aisles Are Not Entities
//! An aisle is a free-text label on a medicine. The list of aisles is always
//! derived from the medicines currently known, never stored on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use uuid::Uuid;

// =============================================================================
// Medicine
// =============================================================================

/// A medicine held in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Medicine {
    /// Unique identifier (UUID v4), generated client-side before the first write.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Units on hand. Never negative; a stored negative value fails to decode.
    #[serde(deserialize_with = "deserialize_stock")]
    pub stock: i64,

    /// Storage aisle label.
    pub aisle: String,
}

impl Medicine {
    /// Builds a medicine with a freshly generated id.
    pub fn new(name: impl Into<String>, stock: i64, aisle: impl Into<String>) -> Self {
        Medicine {
            id: generate_medicine_id(),
            name: name.into(),
            stock,
            aisle: aisle.into(),
        }
    }

    /// Returns true once the medicine carries an identity.
    #[inline]
    pub fn has_id(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Checks whether the medicine can be deleted (by convention only when empty).
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }
}

fn deserialize_stock<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let stock = i64::deserialize(deserializer)?;
    if stock < 0 {
        return Err(serde::de::Error::custom(format!("negative stock: {stock}")));
    }
    Ok(stock)
}

/// Helper to generate a new medicine ID.
pub fn generate_medicine_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// History Entry
// =============================================================================

/// An append-only audit record of a medicine mutation.
///
/// History entries are written as a side effect of add, stock change,
/// detail edit and delete. The client never updates or removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: String,

    /// The medicine this entry describes (not enforced referentially).
    pub medicine_id: String,

    /// Acting principal id.
    pub user_id: String,

    /// Acting principal display name (email).
    pub user: String,

    /// Short label, e.g. "Increased stock of Aspirine by 1".
    pub action: String,

    /// Free text, e.g. "Stock changed from 10 to 11".
    pub details: String,

    /// Creation time. Stored as microseconds since the epoch so the store
    /// orders entries numerically.
    #[serde(with = "chrono::serde::ts_microseconds")]
    #[ts(type = "number")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time. The id is assigned
    /// by the store when the entry is written.
    pub fn record(
        medicine_id: impl Into<String>,
        actor: &Actor,
        action: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        HistoryEntry {
            id: String::new(),
            medicine_id: medicine_id.into(),
            user_id: actor.id.clone(),
            user: actor.name.clone(),
            action: action.into(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

// =============================================================================
// Actor
// =============================================================================

/// The principal performing a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    /// Stable user id from the identity provider.
    pub id: String,
    /// Display name recorded in history (the account email).
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Actor {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Sort Option
// =============================================================================

/// How the medicine list is ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Keep mirror (fetch) order.
    #[default]
    None,
    /// Case-insensitive name, ascending.
    Name,
    /// Stock, ascending.
    Stock,
}

impl SortOption {
    /// All options in picker order.
    pub const ALL: [SortOption; 3] = [SortOption::None, SortOption::Name, SortOption::Stock];

    /// Document field the store orders by, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            SortOption::None => None,
            SortOption::Name => Some("name"),
            SortOption::Stock => Some("stock"),
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOption::None => write!(f, "none"),
            SortOption::Name => write!(f, "name"),
            SortOption::Stock => write!(f, "stock"),
        }
    }
}

/// Returned when a sort option string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown sort option: '{0}'. Valid options: none, name, stock")]
pub struct UnknownSortOption(pub String);

impl std::str::FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(SortOption::None),
            "name" => Ok(SortOption::Name),
            "stock" => Ok(SortOption::Stock),
            other => Err(UnknownSortOption(other.to_string())),
        }
    }
}

// =============================================================================
// Loading Strategy
// =============================================================================

/// How a collection is fetched into the mirror.
///
/// ```text
/// Eager  one unbounded query, mirror replaced on every load
/// Paged  page_size + 1 per request, mirror extended on "load more"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoadingStrategy {
    #[default]
    Eager,
    #[serde(alias = "lazy")]
    Paged,
}

impl LoadingStrategy {
    #[inline]
    pub fn is_paged(&self) -> bool {
        matches!(self, LoadingStrategy::Paged)
    }
}

impl std::fmt::Display for LoadingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadingStrategy::Eager => write!(f, "eager"),
            LoadingStrategy::Paged => write!(f, "paged"),
        }
    }
}

/// Returned when a loading strategy string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown loading strategy: '{0}'. Valid options: eager, paged")]
pub struct UnknownLoadingStrategy(pub String);

impl std::str::FromStr for LoadingStrategy {
    type Err = UnknownLoadingStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "eager" => Ok(LoadingStrategy::Eager),
            "paged" | "lazy" => Ok(LoadingStrategy::Paged),
            other => Err(UnknownLoadingStrategy(other.to_string())),
        }
    }
}

// =============================================================================
// Aisle Summary
// =============================================================================

/// One row of the aisle list: the label and how many medicines it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AisleSummary {
    pub aisle: String,
    pub medicine_count: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_medicine_has_uuid() {
        let medicine = Medicine::new("Aspirine", 10, "A1");
        assert!(medicine.has_id());
        assert!(Uuid::parse_str(&medicine.id).is_ok());
    }

    #[test]
    fn test_negative_stock_does_not_decode() {
        let decoded: Result<Medicine, _> =
            serde_json::from_str(r#"{"id":"m1","name":"Aspirine","stock":-3,"aisle":"A1"}"#);
        assert!(decoded.is_err());

        let decoded: Medicine =
            serde_json::from_str(r#"{"id":"m1","name":"Aspirine","stock":0,"aisle":"A1"}"#).unwrap();
        assert_eq!(decoded.stock, 0);
    }

    #[test]
    fn test_sort_option_parsing() {
        assert_eq!("name".parse::<SortOption>().unwrap(), SortOption::Name);
        assert_eq!("STOCK".parse::<SortOption>().unwrap(), SortOption::Stock);
        assert_eq!("none".parse::<SortOption>().unwrap(), SortOption::None);
        assert!("price".parse::<SortOption>().is_err());
    }

    #[test]
    fn test_sort_option_default() {
        assert_eq!(SortOption::default(), SortOption::None);
        assert_eq!(SortOption::Stock.field(), Some("stock"));
        assert_eq!(SortOption::None.field(), None);
    }

    #[test]
    fn test_loading_strategy_parsing() {
        assert_eq!("eager".parse::<LoadingStrategy>().unwrap(), LoadingStrategy::Eager);
        assert_eq!("lazy".parse::<LoadingStrategy>().unwrap(), LoadingStrategy::Paged);
        assert_eq!("Paged".parse::<LoadingStrategy>().unwrap(), LoadingStrategy::Paged);
        assert!("stream".parse::<LoadingStrategy>().is_err());
        assert_eq!(LoadingStrategy::Paged.to_string(), "paged");
    }

    #[test]
    fn test_history_entry_wire_format() {
        let actor = Actor::new("uid-1", "nurse@example.com");
        let entry = HistoryEntry::record("med-1", &actor, "Added Aspirine", "Added new medicine");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["medicineId"], "med-1");
        assert_eq!(json["userId"], "uid-1");
        assert!(json["timestamp"].is_i64());
    }
}

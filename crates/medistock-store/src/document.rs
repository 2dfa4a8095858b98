//! # Documents and Queries
//!
//! The schema-less document model shared by every [`RemoteStore`] backend.
//!
//! ## Query Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DocumentQuery evaluation                           │
//! │                                                                         │
//! │  collection documents                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  filters (all must match; a missing field never matches)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  total order: order_by field (asc/desc), then id ascending             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  start_after cursor → keep documents strictly after it                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  limit                                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Value Ordering
//! Values of different kinds compare by kind first:
//! `null < number (booleans as 0/1) < string < array/object`.
//! This is the ordering SQLite applies to `json_extract` results, so the
//! in-memory and SQLite backends return documents in the same order.
//!
//! [`RemoteStore`]: crate::remote::RemoteStore

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// Field payload of a document. The id is not part of it.
pub type DocumentData = Map<String, Value>;

/// Upper bound appended to a prefix for range-based prefix search.
pub const PREFIX_SENTINEL: char = '\u{f8ff}';

// =============================================================================
// Document
// =============================================================================

/// A stored document: an id plus a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: DocumentData,
}

impl Document {
    pub fn new(id: impl Into<String>, data: DocumentData) -> Self {
        Document { id: id.into(), data }
    }

    /// Decodes the document into a typed value.
    ///
    /// The document id is injected as field `id` before decoding, so types
    /// carrying an `id` field receive the store's id.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        let mut map = self.data.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    /// Encodes a typed value into document data, stripping its `id` field.
    pub fn encode<T: Serialize>(value: &T) -> StoreResult<DocumentData> {
        match serde_json::to_value(value)? {
            Value::Object(mut map) => {
                map.remove("id");
                Ok(map)
            }
            other => Err(StoreError::Serialization(format!(
                "expected a JSON object, got {}",
                kind_name(&other)
            ))),
        }
    }

    /// Returns a top-level field value.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

// =============================================================================
// Filters and Ordering
// =============================================================================

/// A single field predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equal(String, Value),
    GreaterOrEqual(String, Value),
    LessThan(String, Value),
}

impl Filter {
    pub fn field(&self) -> &str {
        match self {
            Filter::Equal(field, _) | Filter::GreaterOrEqual(field, _) | Filter::LessThan(field, _) => field,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Filter::Equal(_, value) | Filter::GreaterOrEqual(_, value) | Filter::LessThan(_, value) => value,
        }
    }

    /// Evaluates the predicate against a document.
    pub fn matches(&self, document: &Document) -> bool {
        let Some(actual) = document.field(self.field()) else {
            return false;
        };
        if actual.is_null() {
            return false;
        }

        let ordering = compare_values(actual, self.value());
        match self {
            Filter::Equal(..) => ordering == Ordering::Equal,
            Filter::GreaterOrEqual(..) => ordering != Ordering::Less,
            Filter::LessThan(..) => ordering == Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Sort key of a query. Ties are always broken by id ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn ascending(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        OrderBy {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// Position of the last visible document of a page.
///
/// Captures the document id and, when the query is ordered, the value of
/// the ordering field, so the next page resumes strictly after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub id: String,
    pub order_value: Value,
}

// =============================================================================
// Query
// =============================================================================

/// A collection query.
///
/// ## Example
/// ```rust
/// use medistock_store::document::{DocumentQuery, OrderBy};
///
/// let query = DocumentQuery::new()
///     .prefix("name", "Asp")
///     .order_by(OrderBy::ascending("name"))
///     .limit(21);
/// assert_eq!(query.filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub start_after: Option<Cursor>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Filter::Equal(field.into(), value.into()))
    }

    /// Adds the `>= text` / `< text + U+F8FF` range that selects string
    /// values starting with `text` (case-sensitive).
    pub fn prefix(self, field: &str, text: &str) -> Self {
        let upper = format!("{text}{PREFIX_SENTINEL}");
        self.filter(Filter::GreaterOrEqual(field.to_string(), Value::String(text.to_string())))
            .filter(Filter::LessThan(field.to_string(), Value::String(upper)))
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, cursor: Option<Cursor>) -> Self {
        self.start_after = cursor;
        self
    }

    /// Builds the cursor that resumes this query after `document`.
    pub fn cursor_for(&self, document: &Document) -> Cursor {
        let order_value = self
            .order_by
            .as_ref()
            .and_then(|order| document.field(&order.field))
            .cloned()
            .unwrap_or(Value::Null);

        Cursor {
            id: document.id.clone(),
            order_value,
        }
    }

    /// Compares two documents in this query's total order.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let by_field = match &self.order_by {
            Some(order) => {
                let ordering = compare_values(
                    a.field(&order.field).unwrap_or(&Value::Null),
                    b.field(&order.field).unwrap_or(&Value::Null),
                );
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            }
            None => Ordering::Equal,
        };

        by_field.then_with(|| a.id.cmp(&b.id))
    }

    /// Returns true if `document` sorts strictly after `cursor`.
    pub fn is_after(&self, document: &Document, cursor: &Cursor) -> bool {
        let by_field = match &self.order_by {
            Some(order) => {
                let ordering = compare_values(
                    document.field(&order.field).unwrap_or(&Value::Null),
                    &cursor.order_value,
                );
                match order.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            }
            None => Ordering::Equal,
        };

        by_field.then_with(|| document.id.cmp(&cursor.id)) == Ordering::Greater
    }

    /// Evaluates the whole query over an unordered set of documents.
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut selected: Vec<Document> = documents
            .into_iter()
            .filter(|doc| self.filters.iter().all(|f| f.matches(doc)))
            .filter(|doc| match &self.start_after {
                Some(cursor) => self.is_after(doc, cursor),
                None => true,
            })
            .collect();

        selected.sort_by(|a, b| self.compare(a, b));

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

// =============================================================================
// Value Comparison
// =============================================================================

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) | Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) | Value::Object(_) => 3,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_number(value: &Value) -> f64 {
    match value {
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Total order over JSON values used for filtering, sorting and cursors.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let rank = kind_rank(a).cmp(&kind_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(_) | Value::Object(_), _) => a.to_string().cmp(&b.to_string()),
        _ => {
            // Integers compare exactly; mixed int/float falls back to f64
            match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => x.cmp(&y),
                _ => as_number(a).total_cmp(&as_number(b)),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

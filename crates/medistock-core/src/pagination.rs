//! # Pagination
//!
//! Over-fetch-by-one paging math.
//!
//! ## How "More Available" Is Detected
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  page_size = 2  →  ask the store for 3 documents                       │
//! │                                                                         │
//! │  store returns [a, b, c]  → show [a, b], has_more = true,              │
//! │                             cursor = b (last visible)                  │
//! │  store returns [a, b]     → show [a, b], has_more = false              │
//! │                                                                         │
//! │  next page starts strictly after the cursor                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Page size requested from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_size: usize,
}

impl PageRequest {
    /// Creates a page request. A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        PageRequest {
            page_size: page_size.max(1),
        }
    }

    /// Number of visible items per page.
    #[inline]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of documents to ask the store for.
    #[inline]
    pub fn fetch_limit(&self) -> usize {
        self.page_size + 1
    }

    /// Splits a fetched batch into the visible page and the "more" flag.
    pub fn split<T>(&self, items: Vec<T>) -> Page<T> {
        split_page(items, self.page_size)
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Visible items (at most `page_size`).
    pub items: Vec<T>,
    /// Whether the store holds at least one more item.
    pub has_more: bool,
}

/// Drops the over-fetched item, if present, and reports whether it existed.
pub fn split_page<T>(mut items: Vec<T>, page_size: usize) -> Page<T> {
    let has_more = items.len() > page_size;
    items.truncate(page_size);
    Page { items, has_more }
}

/// What a load operation reports back to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Entries added to (or placed in) the mirror by this call.
    pub fetched: usize,
    /// Whether another page can be requested.
    pub has_more: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

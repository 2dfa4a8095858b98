//! # Derived Views
//!
//! Pure functions that derive what the screens show from the mirror.
//!
//! ## Medicine List Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  mirror (fetch order)                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search text empty? ──yes──► keep all                                  │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  keep names containing the text (case-insensitive)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SortOption::Name  → lowercase name ascending (stable)                 │
//! │  SortOption::Stock → stock ascending (stable)                          │
//! │  SortOption::None  → untouched                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in this module holds state: calling a function twice with the
//! same input yields the same output.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{AisleSummary, HistoryEntry, Medicine, SortOption};

/// Filters and sorts medicines for the list screen.
///
/// ## Example
/// ```rust
/// use medistock_core::view::filter_and_sort;
/// use medistock_core::{Medicine, SortOption};
///
/// let medicines = vec![
///     Medicine::new("Aspirine", 10, "A1"),
///     Medicine::new("Paracétamol", 20, "B1"),
/// ];
/// let shown = filter_and_sort(&medicines, "asp", SortOption::None);
/// assert_eq!(shown.len(), 1);
/// assert_eq!(shown[0].name, "Aspirine");
/// ```
pub fn filter_and_sort(medicines: &[Medicine], search: &str, sort: SortOption) -> Vec<Medicine> {
    let needle = search.to_lowercase();

    let mut shown: Vec<Medicine> = if needle.is_empty() {
        medicines.to_vec()
    } else {
        medicines
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    };

    match sort {
        SortOption::Name => shown.sort_by_cached_key(|m| m.name.to_lowercase()),
        SortOption::Stock => shown.sort_by_key(|m| m.stock),
        SortOption::None => {}
    }

    shown
}

/// Sorted set of distinct aisle labels.
pub fn aisles_of(medicines: &[Medicine]) -> Vec<String> {
    medicines
        .iter()
        .map(|m| m.aisle.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Medicines stored in one aisle, in mirror order.
pub fn medicines_in_aisle(medicines: &[Medicine], aisle: &str) -> Vec<Medicine> {
    medicines.iter().filter(|m| m.aisle == aisle).cloned().collect()
}

/// One summary per aisle, aisles sorted.
pub fn aisle_summaries(medicines: &[Medicine]) -> Vec<AisleSummary> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for medicine in medicines {
        *counts.entry(medicine.aisle.as_str()).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(aisle, medicine_count)| AisleSummary {
            aisle: aisle.to_string(),
            medicine_count,
        })
        .collect()
}

/// History ordered newest first.
pub fn history_newest_first(entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Actor;
    use chrono::{Duration, Utc};

    fn medicine(name: &str, stock: i64, aisle: &str) -> Medicine {
        Medicine::new(name, stock, aisle)
    }

    fn names(medicines: &[Medicine]) -> Vec<&str> {
        medicines.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let medicines = vec![medicine("Aspirine", 10, "A1"), medicine("Paracétamol", 20, "B1")];

        assert_eq!(names(&filter_and_sort(&medicines, "asp", SortOption::None)), ["Aspirine"]);
        assert_eq!(names(&filter_and_sort(&medicines, "CÉTA", SortOption::None)), ["Paracétamol"]);
        assert_eq!(filter_and_sort(&medicines, "", SortOption::None).len(), 2);
        assert!(filter_and_sort(&medicines, "xyz", SortOption::None).is_empty());
    }

    #[test]
    fn test_sort_by_stock_ascending() {
        let medicines = vec![
            medicine("Aspirine", 20, "A1"),
            medicine("Paracétamol", 10, "B1"),
            medicine("Ibuprofène", 15, "C1"),
        ];

        let stocks: Vec<i64> = filter_and_sort(&medicines, "", SortOption::Stock)
            .iter()
            .map(|m| m.stock)
            .collect();
        assert_eq!(stocks, [10, 15, 20]);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let medicines = vec![
            medicine("paracétamol", 1, "B1"),
            medicine("Ibuprofène", 1, "C1"),
            medicine("aspirine", 1, "A1"),
        ];

        assert_eq!(
            names(&filter_and_sort(&medicines, "", SortOption::Name)),
            ["aspirine", "Ibuprofène", "paracétamol"]
        );
    }

    #[test]
    fn test_sort_none_keeps_fetch_order_and_is_stable() {
        let medicines = vec![
            medicine("B", 5, "A1"),
            medicine("A", 5, "A1"),
            medicine("C", 1, "A1"),
        ];

        assert_eq!(names(&filter_and_sort(&medicines, "", SortOption::None)), ["B", "A", "C"]);
        // Equal stocks keep their relative order
        assert_eq!(names(&filter_and_sort(&medicines, "", SortOption::Stock)), ["C", "B", "A"]);
    }

    #[test]
    fn test_derived_view_is_idempotent() {
        let medicines = vec![medicine("Aspirine", 20, "A1"), medicine("Aspégic", 10, "A2")];

        let first = filter_and_sort(&medicines, "asp", SortOption::Stock);
        let second = filter_and_sort(&medicines, "asp", SortOption::Stock);
        assert_eq!(first, second);
    }

    #[test]
    fn test_aisles_and_summaries() {
        let medicines = vec![
            medicine("Aspirine", 1, "B1"),
            medicine("Doliprane", 1, "A1"),
            medicine("Efferalgan", 1, "B1"),
        ];

        assert_eq!(aisles_of(&medicines), ["A1", "B1"]);
        assert_eq!(names(&medicines_in_aisle(&medicines, "B1")), ["Aspirine", "Efferalgan"]);

        let summaries = aisle_summaries(&medicines);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].aisle, "B1");
        assert_eq!(summaries[1].medicine_count, 2);
    }

    #[test]
    fn test_history_newest_first() {
        let actor = Actor::new("uid", "nurse@example.com");
        let mut older = HistoryEntry::record("m", &actor, "Added", "");
        older.timestamp = Utc::now() - Duration::minutes(5);
        let newer = HistoryEntry::record("m", &actor, "Increased", "");

        let sorted = history_newest_first(&[older.clone(), newer.clone()]);
        assert_eq!(sorted[0].action, "Increased");
        assert_eq!(sorted[1].action, "Added");
    }
}

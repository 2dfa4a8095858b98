//! # Error Types
//!
//! The closed error taxonomy shared by every MediStock layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  medistock-core (this file)                                            │
//! │  └── MedicError       - What the UI sees (one value at a time)         │
//! │      ├── validation   - raised synchronously, never touch the network  │
//! │      ├── read/write   - store failures mapped at the call site         │
//! │      ├── auth         - session gateway failures                       │
//! │      └── lookup       - MedicineNotFound                               │
//! │                                                                         │
//! │  medistock-store (separate crate)                                      │
//! │  ├── StoreError        - Document store failures                       │
//! │  └── AuthProviderError - Identity provider failures                    │
//! │                                                                         │
//! │  Flow: StoreError → (mapped by the engine) → MedicError → error slot   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Variants carry no payload: the message is fixed per variant
//! 3. Store errors never cross into the UI untranslated

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// MedicError
// =============================================================================

/// Every failure the presentation layer can be shown.
///
/// Only the most recent error is retained by the engine and the session
/// gateway; a newer failure overwrites the older one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MedicError {
    // =========================================================================
    // Authentication
    // =========================================================================
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter a valid password")]
    InvalidPassword,

    #[error("sign in failed")]
    SignInFailed,

    #[error("An account already exists with this email")]
    EmailAlreadyInUse,

    #[error("Password is too weak")]
    WeakPassword,

    #[error("sign up failed")]
    SignUpFailed,

    #[error("sign out failed")]
    SignOutFailed,

    // =========================================================================
    // Remote reads and writes
    // =========================================================================
    /// The stock write was rejected; the optimistic value has been rolled back.
    #[error("Failed to update stock. Please try again.")]
    UpdateStockError,

    #[error("Failed to fetch history")]
    FetchHistoryError,

    #[error("Failed to add medicine")]
    AddMedicineError,

    #[error("Failed to delete medicine")]
    DeleteMedicineError,

    #[error("Failed to update medicine")]
    UpdateMedicineError,

    /// The primary mutation succeeded but its audit record could not be written.
    #[error("Failed to add history entry")]
    AddHistoryError,

    #[error("Failed to fetch data from server")]
    FetchDataError,

    #[error("Failed to read medicine data")]
    DecodingError,

    // =========================================================================
    // Lookup
    // =========================================================================
    #[error("Medicine not found")]
    MedicineNotFound,

    // =========================================================================
    // Validation
    // =========================================================================
    #[error("Invalid medicine ID")]
    InvalidMedicineId,

    #[error("Medicine name cannot be empty")]
    InvalidMedicineName,

    #[error("Stock must be a valid number")]
    InvalidStock,

    #[error("Aisle must be selected or created")]
    InvalidAisle,
}

impl MedicError {
    /// Machine-readable code for the presentation layer.
    pub fn code(&self) -> &'static str {
        match self {
            MedicError::InvalidEmail => "INVALID_EMAIL",
            MedicError::InvalidPassword => "INVALID_PASSWORD",
            MedicError::SignInFailed => "SIGN_IN_FAILED",
            MedicError::EmailAlreadyInUse => "EMAIL_ALREADY_IN_USE",
            MedicError::WeakPassword => "WEAK_PASSWORD",
            MedicError::SignUpFailed => "SIGN_UP_FAILED",
            MedicError::SignOutFailed => "SIGN_OUT_FAILED",
            MedicError::UpdateStockError => "UPDATE_STOCK_ERROR",
            MedicError::FetchHistoryError => "FETCH_HISTORY_ERROR",
            MedicError::AddMedicineError => "ADD_MEDICINE_ERROR",
            MedicError::DeleteMedicineError => "DELETE_MEDICINE_ERROR",
            MedicError::UpdateMedicineError => "UPDATE_MEDICINE_ERROR",
            MedicError::AddHistoryError => "ADD_HISTORY_ERROR",
            MedicError::FetchDataError => "FETCH_DATA_ERROR",
            MedicError::DecodingError => "DECODING_ERROR",
            MedicError::MedicineNotFound => "MEDICINE_NOT_FOUND",
            MedicError::InvalidMedicineId => "INVALID_MEDICINE_ID",
            MedicError::InvalidMedicineName => "INVALID_MEDICINE_NAME",
            MedicError::InvalidStock => "INVALID_STOCK",
            MedicError::InvalidAisle => "INVALID_AISLE",
        }
    }

    /// Returns true for input errors detected before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            MedicError::InvalidMedicineId
                | MedicError::InvalidMedicineName
                | MedicError::InvalidStock
                | MedicError::InvalidAisle
        )
    }

    /// Returns true for errors raised by the session gateway.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            MedicError::InvalidEmail
                | MedicError::InvalidPassword
                | MedicError::SignInFailed
                | MedicError::EmailAlreadyInUse
                | MedicError::WeakPassword
                | MedicError::SignUpFailed
                | MedicError::SignOutFailed
        )
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with MedicError.
pub type MedicResult<T> = Result<T, MedicError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MedicError::UpdateStockError.to_string(),
            "Failed to update stock. Please try again."
        );
        assert_eq!(
            MedicError::InvalidMedicineName.to_string(),
            "Medicine name cannot be empty"
        );
    }

    #[test]
    fn test_error_categories() {
        assert!(MedicError::InvalidStock.is_validation());
        assert!(MedicError::InvalidMedicineId.is_validation());
        assert!(!MedicError::AddMedicineError.is_validation());

        assert!(MedicError::WeakPassword.is_auth());
        assert!(!MedicError::FetchDataError.is_auth());
    }

    #[test]
    fn test_error_codes_are_unique() {
        let all = [
            MedicError::InvalidEmail,
            MedicError::InvalidPassword,
            MedicError::SignInFailed,
            MedicError::EmailAlreadyInUse,
            MedicError::WeakPassword,
            MedicError::SignUpFailed,
            MedicError::SignOutFailed,
            MedicError::UpdateStockError,
            MedicError::FetchHistoryError,
            MedicError::AddMedicineError,
            MedicError::DeleteMedicineError,
            MedicError::UpdateMedicineError,
            MedicError::AddHistoryError,
            MedicError::FetchDataError,
            MedicError::DecodingError,
            MedicError::MedicineNotFound,
            MedicError::InvalidMedicineId,
            MedicError::InvalidMedicineName,
            MedicError::InvalidStock,
            MedicError::InvalidAisle,
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), all.len());
    }
}

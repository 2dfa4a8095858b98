//! # Validation Module
//!
//! Input validation for MediStock. Every check here is local and
//! synchronous: a failed validation never reaches the document store or the
//! identity provider.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Add Medicine Validation                            │
//! │                                                                         │
//! │  User submits: name, stock text, aisle                                 │
//! │       │                                                                 │
//! │       ├── name empty?            → InvalidMedicineName                 │
//! │       │                                                                 │
//! │       ├── stock not an int >= 0? → InvalidStock                        │
//! │       │                                                                 │
//! │       ├── aisle empty?           → InvalidAisle                        │
//! │       │                                                                 │
//! │       └── OK → NewMedicine { name, stock, aisle } → store write        │
//! │                                                                         │
//! │  Order matters: the first violated rule is the one reported.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medistock_core::validation::validate_new_medicine;
//! use medistock_core::MedicError;
//!
//! let input = validate_new_medicine("Aspirine", "10", "A1").unwrap();
//! assert_eq!(input.stock, 10);
//!
//! assert_eq!(
//!     validate_new_medicine("Aspirine", "-1", "A1").unwrap_err(),
//!     MedicError::InvalidStock
//! );
//! ```

use crate::error::{MedicError, MedicResult};

/// Symbols accepted (and one of which is required) by the password policy.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Maximum search query length.
pub const MAX_SEARCH_LENGTH: usize = 100;

// =============================================================================
// Medicine Input
// =============================================================================

/// Validated, trimmed input for a new medicine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicine {
    pub name: String,
    pub stock: i64,
    pub aisle: String,
}

/// Validates the add-medicine form.
///
/// ## Rules (checked in this order)
/// 1. Name must not be empty
/// 2. Stock text must parse to an integer >= 0
/// 3. Aisle must not be empty
pub fn validate_new_medicine(name: &str, stock_text: &str, aisle: &str) -> MedicResult<NewMedicine> {
    let name = validate_medicine_name(name)?;
    let stock = parse_stock(stock_text)?;
    let aisle = validate_aisle(aisle)?;

    Ok(NewMedicine { name, stock, aisle })
}

/// Validates an edit of a medicine's name and aisle.
pub fn validate_medicine_details(name: &str, aisle: &str) -> MedicResult<(String, String)> {
    Ok((validate_medicine_name(name)?, validate_aisle(aisle)?))
}

/// Validates a medicine name, returning it trimmed.
pub fn validate_medicine_name(name: &str) -> MedicResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MedicError::InvalidMedicineName);
    }
    Ok(name.to_string())
}

/// Validates an aisle label, returning it trimmed.
pub fn validate_aisle(aisle: &str) -> MedicResult<String> {
    let aisle = aisle.trim();
    if aisle.is_empty() {
        return Err(MedicError::InvalidAisle);
    }
    Ok(aisle.to_string())
}

/// Parses the stock text field.
///
/// ## Example
/// ```rust
/// use medistock_core::validation::parse_stock;
///
/// assert_eq!(parse_stock("0"), Ok(0));
/// assert!(parse_stock("ten").is_err());
/// assert!(parse_stock("-3").is_err());
/// ```
pub fn parse_stock(stock_text: &str) -> MedicResult<i64> {
    match stock_text.trim().parse::<i64>() {
        Ok(stock) if stock >= 0 => Ok(stock),
        _ => Err(MedicError::InvalidStock),
    }
}

/// Validates that a medicine id is present.
pub fn validate_medicine_id(id: &str) -> MedicResult<()> {
    if id.trim().is_empty() {
        return Err(MedicError::InvalidMedicineId);
    }
    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (no filtering)
/// - Longer queries are cut at [`MAX_SEARCH_LENGTH`] characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> String {
    query.trim().chars().take(MAX_SEARCH_LENGTH).collect()
}

// =============================================================================
// Credentials
// =============================================================================

/// Validates that an email was entered. Format checks belong to the
/// identity provider.
pub fn validate_email_present(email: &str) -> MedicResult<()> {
    if email.trim().is_empty() {
        return Err(MedicError::InvalidEmail);
    }
    Ok(())
}

/// Checks the sign-up password policy.
///
/// ## Rules
/// - At least [`MIN_PASSWORD_LENGTH`] characters
/// - At least one uppercase letter, one lowercase letter and one digit
/// - At least one symbol from [`PASSWORD_SYMBOLS`]
/// - No characters outside ASCII letters, digits and those symbols
///
/// ## Example
/// ```rust
/// use medistock_core::validation::is_password_strong;
///
/// assert!(is_password_strong("Medistock#2025"));
/// assert!(!is_password_strong("medistock2025"));
/// ```
pub fn is_password_strong(password: &str) -> bool {
    let is_symbol = |c: char| PASSWORD_SYMBOLS.contains(c);

    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(is_symbol)
        && password.chars().all(|c| c.is_ascii_alphanumeric() || is_symbol(c))
}

// =============================================================================
// Unit Tests
// =============================================================================

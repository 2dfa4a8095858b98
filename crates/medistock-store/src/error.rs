//! # Store Error Types
//!
//! Error types for document store and identity provider operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite error (sqlx::Error) / JSON error / backend outage              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MedicError (medistock-sync) ← One variant per failed operation        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Error slot → presentation layer shows the message                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never inspects the store error beyond logging it: a failed
//! write is a failed write, whatever the cause.

use thiserror::Error;

// =============================================================================
// Store Errors
// =============================================================================

/// Document store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found.
    ///
    /// ## When This Occurs
    /// - `update_fields` on an id that was never written or was deleted
    #[error("{collection} document not found: {id}")]
    NotFound { collection: String, id: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Document payload could not be (de)serialized.
    ///
    /// ## When This Occurs
    /// - Stored JSON is not an object
    /// - A required field is missing or has the wrong type
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Backend temporarily unreachable (network down, injected failure).
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Creates a NotFound error for a collection and document id.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Returns true if retrying the same call later might succeed.
    ///
    /// The engine does not retry on its own; this is exposed for callers
    /// that want to offer a "try again" action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectionFailed(_) | StoreError::Unavailable(_) | StoreError::PoolExhausted
        )
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut   → StoreError::PoolExhausted
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// sqlx::Error::Io             → StoreError::Unavailable
/// Other                       → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            sqlx::Error::Io(io_err) => StoreError::Unavailable(io_err.to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Identity Provider Errors
// =============================================================================

/// Errors reported by an identity provider.
///
/// Mirrors the error codes a hosted identity service returns; the session
/// gateway maps them onto the user-facing taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthProviderError {
    /// An account already exists for this email.
    #[error("Email already in use")]
    EmailAlreadyInUse,

    /// The email is malformed.
    #[error("Invalid email address")]
    InvalidEmail,

    /// The password does not meet the provider's own policy.
    #[error("Password is too weak")]
    WeakPassword,

    /// Email and password do not match.
    #[error("Wrong credentials")]
    WrongCredentials,

    /// No account exists for this email.
    #[error("User not found")]
    UserNotFound,

    /// Provider unreachable.
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    /// Internal provider error (hashing, token signing).
    #[error("Internal identity provider error: {0}")]
    Internal(String),
}

/// Result type for identity provider operations.
pub type AuthResult<T> = Result<T, AuthProviderError>;

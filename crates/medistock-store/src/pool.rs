//! # Document Database
//!
//! Opens the SQLite file that backs [`SqliteDocumentStore`] and brings its
//! schema up to date.
//!
//! ## Opening
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::new("medistock.db")        DbConfig::in_memory()            │
//! │       │                                    │                            │
//! │       │  file, WAL journal,                │  private database,         │
//! │       │  created if missing                │  one pinned connection     │
//! │       └──────────────┬─────────────────────┘                            │
//! │                      ▼                                                  │
//! │  Database::new(config)                                                  │
//! │       ├── connect                                                       │
//! │       └── apply embedded migrations (migrations/sqlite)                 │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  db.documents()  →  SqliteDocumentStore (shares the pool)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An in-memory database lives exactly as long as its one connection, so
//! that connection never idles out.
//!
//! [`SqliteDocumentStore`]: crate::repository::documents::SqliteDocumentStore

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::repository::documents::SqliteDocumentStore;

/// Schema for the `documents` table, embedded at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Connections kept for a file database. Reads and writes come from one
/// engine, so a handful is plenty.
const FILE_POOL_SIZE: u32 = 4;

// =============================================================================
// Configuration
// =============================================================================

/// Where the document database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database file, or `None` for a private in-memory database.
    pub database_path: Option<PathBuf>,
}

impl DbConfig {
    /// A file database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: Some(path.into()),
        }
    }

    /// A throwaway database for tests and the emulator.
    pub fn in_memory() -> Self {
        DbConfig { database_path: None }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.is_none()
    }
}

// =============================================================================
// Database
// =============================================================================

/// An open, migrated document database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and applies pending migrations.
    pub async fn new(config: DbConfig) -> StoreResult<Self> {
        let (options, pool_options) = match &config.database_path {
            Some(path) => {
                info!(path = %path.display(), "Opening document database");
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal);
                (options, SqlitePoolOptions::new().max_connections(FILE_POOL_SIZE))
            }
            None => {
                info!("Opening in-memory document database");
                let options = SqliteConnectOptions::new().in_memory(true);
                let pool_options = SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None);
                (options, pool_options)
            }
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        MIGRATOR.run(&pool).await?;
        debug!(migrations = MIGRATOR.migrations.len(), "Document schema up to date");

        Ok(Database { pool })
    }

    /// The document store over this database.
    pub fn documents(&self) -> SqliteDocumentStore {
        SqliteDocumentStore::new(self.pool.clone())
    }

    /// Closes every connection. Stores obtained from [`Database::documents`]
    /// fail afterwards.
    pub async fn close(&self) {
        info!("Closing document database");
        self.pool.close().await;
    }

    /// Returns true while the database answers queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

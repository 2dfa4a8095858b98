//! # Inventory Configuration
//!
//! Configuration management for the inventory sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEDISTOCK_MEDICINE_LOADING=paged                                   │
//! │     MEDISTOCK_PAGE_SIZE=50                                             │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/medistock/medistock.toml (Linux)                         │
//! │     ~/Library/Application Support/com.medistock.medistock/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     eager loading, page size 20, client-side filtering                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # medistock.toml
//! [loading]
//! medicines = "paged"  # eager | paged
//! history = "eager"
//! page_size = 20
//!
//! [query]
//! server_side_filtering = false
//!
//! [store]
//! database_path = "medistock.db"
//! use_emulator = false
//! ```

use std::path::PathBuf;

use medistock_core::{LoadingStrategy, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Loading Settings
// =============================================================================

/// How medicines and history are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingSettings {
    /// Strategy for the medicine list.
    #[serde(default)]
    pub medicines: LoadingStrategy,

    /// Strategy for a medicine's history.
    #[serde(default)]
    pub history: LoadingStrategy,

    /// Visible items per page when paged.
    /// Default: 20
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for LoadingSettings {
    fn default() -> Self {
        LoadingSettings {
            medicines: LoadingStrategy::default(),
            history: LoadingStrategy::default(),
            page_size: default_page_size(),
        }
    }
}

// =============================================================================
// Query Settings
// =============================================================================

/// Where search and sort are evaluated.
///
/// ```text
/// server_side_filtering = false   mirror holds everything fetched;
///                                 search/sort applied in memory
/// server_side_filtering = true    search becomes a name prefix range,
///                                 sort becomes the store's order_by;
///                                 the mirror is shown as-is
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySettings {
    #[serde(default)]
    pub server_side_filtering: bool,
}

// =============================================================================
// Store Settings
// =============================================================================

/// Backend selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Use the in-memory store and local identity provider instead.
    #[serde(default)]
    pub use_emulator: bool,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("medistock.db")
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            database_path: default_database_path(),
            use_emulator: false,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub loading: LoadingSettings,

    #[serde(default)]
    pub query: QuerySettings,

    #[serde(default)]
    pub store: StoreSettings,
}

impl InventoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (medistock.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading inventory config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load inventory config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Inventory config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.loading.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be greater than 0".into()));
        }

        if !self.store.use_emulator && self.store.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path is required unless use_emulator is set".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("MEDISTOCK_MEDICINE_LOADING") {
            match value.parse() {
                Ok(strategy) => {
                    debug!(strategy = %value, "Overriding medicine loading from environment");
                    self.loading.medicines = strategy;
                }
                Err(e) => warn!(error = %e, "Ignoring MEDISTOCK_MEDICINE_LOADING"),
            }
        }

        if let Ok(value) = std::env::var("MEDISTOCK_HISTORY_LOADING") {
            match value.parse() {
                Ok(strategy) => self.loading.history = strategy,
                Err(e) => warn!(error = %e, "Ignoring MEDISTOCK_HISTORY_LOADING"),
            }
        }

        if let Ok(value) = std::env::var("MEDISTOCK_PAGE_SIZE") {
            if let Ok(size) = value.parse::<usize>() {
                debug!(page_size = size, "Overriding page size from environment");
                self.loading.page_size = size;
            }
        }

        if let Ok(value) = std::env::var("MEDISTOCK_SERVER_FILTERING") {
            if let Some(enabled) = parse_flag(&value) {
                self.query.server_side_filtering = enabled;
            }
        }

        if let Ok(path) = std::env::var("MEDISTOCK_DATABASE_PATH") {
            self.store.database_path = PathBuf::from(path);
        }

        if let Ok(value) = std::env::var("MEDISTOCK_USE_EMULATOR") {
            if let Some(enabled) = parse_flag(&value) {
                debug!(enabled, "Overriding emulator flag from environment");
                self.store.use_emulator = enabled;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "medistock", "medistock")
            .map(|dirs| dirs.config_dir().join("medistock.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn medicine_loading(&self) -> LoadingStrategy {
        self.loading.medicines
    }

    pub fn history_loading(&self) -> LoadingStrategy {
        self.loading.history
    }

    pub fn page_size(&self) -> usize {
        self.loading.page_size
    }

    pub fn server_side_filtering(&self) -> bool {
        self.query.server_side_filtering
    }

    // Builders used by tests and embedding applications

    pub fn with_medicine_loading(mut self, strategy: LoadingStrategy) -> Self {
        self.loading.medicines = strategy;
        self
    }

    pub fn with_history_loading(mut self, strategy: LoadingStrategy) -> Self {
        self.loading.history = strategy;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.loading.page_size = page_size;
        self
    }

    pub fn with_server_side_filtering(mut self, enabled: bool) -> Self {
        self.query.server_side_filtering = enabled;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Configuration for the todo store.
//!
//! Settings are merged field by field from several tiers:
//! 1. **Defaults** - compiled in
//! 2. **Project** - `$CWD/.todo-store/config.yaml`
//! 3. **User** - `~/.todo-store/config.yaml`
//! 4. **Environment** - `TODO_STORE_*` variables
//!
//! An explicit config file (`--config` or `TODO_STORE_CONFIG_PATH`) replaces
//! the project and user tiers.
//!
//! ## Environment Variables
//! - `TODO_STORE_CONFIG_PATH` - Explicit config file
//! - `TODO_STORE_DB_PATH` - Database file
//! - `TODO_STORE_BUSY_TIMEOUT_MS` - SQLite busy timeout in milliseconds
//! - `TODO_STORE_PROJECT_DIR` - Project config dir (default: `./.todo-store`)
//! - `TODO_STORE_USER_DIR` - User config dir (default: `~/.todo-store`)

mod loader;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, deep_merge, deep_merge_all};

use crate::store::{DATABASE_NAME, LocalStore, StoreLocation};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// How long SQLite waits on a locked database, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Keep everything in memory; `db_path` is ignored.
    #[serde(default)]
    pub in_memory: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            in_memory: false,
        }
    }
}

/// `<local data dir>/todo-store/doitnow.db`, or `.todo-store/doitnow.db` when
/// the platform has no data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("todo-store"))
        .unwrap_or_else(|| PathBuf::from(".todo-store"))
        .join(DATABASE_NAME)
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Config {
    pub fn location(&self) -> StoreLocation {
        if self.store.in_memory {
            StoreLocation::InMemory
        } else {
            StoreLocation::File(self.store.db_path.clone())
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.store.busy_timeout_ms)
    }

    /// Build a store for this configuration. Nothing is opened until first use.
    pub fn build_store(&self) -> LocalStore {
        LocalStore::new(self.location()).with_busy_timeout(self.busy_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_doitnow_db() {
        let config = Config::default();
        assert!(config.store.db_path.ends_with(DATABASE_NAME));
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
        assert!(matches!(config.location(), StoreLocation::File(_)));
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("store:\n  busy_timeout_ms: 250\n").unwrap();
        assert_eq!(config.store.busy_timeout_ms, 250);
        assert_eq!(config.store.db_path, default_db_path());
    }

    #[test]
    fn in_memory_overrides_path() {
        let mut config = Config::default();
        config.store.in_memory = true;
        assert_eq!(config.location(), StoreLocation::InMemory);
        assert_eq!(*config.build_store().location(), StoreLocation::InMemory);
    }
}

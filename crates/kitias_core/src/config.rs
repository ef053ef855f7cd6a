//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Resolution never fails: blank or missing values fall back to defaults.
//! - Invalid log levels are not checked here; `init_logging` rejects them.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "KITIAS_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "KITIAS_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "KITIAS_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "kitias.sqlite3";

/// Settings shared by core consumers (CLI, host services).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging is enabled only when set.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Reads `KITIAS_*` process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

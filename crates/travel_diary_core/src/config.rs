//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank environment values are treated as unset.
//! - Resolution never fails; every field has a default except the
//!   notification project id.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TRAVEL_DIARY_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TRAVEL_DIARY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TRAVEL_DIARY_LOG_DIR";
pub const ENV_PROJECT_ID: &str = "TRAVEL_DIARY_PROJECT_ID";

const DEFAULT_DB_FILE_NAME: &str = "travel_diary.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "travel_diary_logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file backing the key-value substrate.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
    /// Push project id; notifications stay disabled without it.
    pub project_id: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let temp_dir = std::env::temp_dir();
        Self {
            db_path: temp_dir.join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: temp_dir.join(DEFAULT_LOG_DIR_NAME),
            project_id: None,
        }
    }
}

impl CoreConfig {
    /// Reads `TRAVEL_DIARY_*` variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }
        config.project_id = read(ENV_PROJECT_ID);
        config
    }
}

//! Runtime configuration consumed by the core.
//!
//! # Responsibility
//! - Resolve backend selection, backend parameters and logging settings
//!   from a key lookup (the process environment in production).
//!
//! # Invariants
//! - Missing or blank values fall back to documented defaults.
//! - Resolution never fails; unknown backends are rejected later by the
//!   store registry.

use crate::logging::default_log_level;
use crate::store::registry::MEMORY_BACKEND;
use crate::store::StoreOptions;
use std::path::PathBuf;

/// Selects the storage backend by registry name.
pub const ENV_BACKEND: &str = "SERVER_STATE";
/// Database file for the `sqlite` backend.
pub const ENV_SQLITE_FILENAME: &str = "SQLITE_FILENAME";
/// Log level (`trace|debug|info|warn|error`).
pub const ENV_LOG_LEVEL: &str = "PAGES_LOG_LEVEL";
/// Absolute log directory; logging stays off when unset.
pub const ENV_LOG_DIR: &str = "PAGES_LOG_DIR";

const DEFAULT_SQLITE_FILENAME: &str = "/tmp/db.sqlite";

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub backend: String,
    pub sqlite_path: PathBuf,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            backend: value(ENV_BACKEND).unwrap_or_else(|| MEMORY_BACKEND.to_string()),
            sqlite_path: value(ENV_SQLITE_FILENAME)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SQLITE_FILENAME)),
            log_level: value(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Backend construction parameters derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            sqlite_path: self.sqlite_path.clone(),
        }
    }
}

//! Name-keyed backend registry used at startup.

use super::memory::MemoryStore;
use super::sqlite::SqliteStore;
use super::{Store, StoreError, StoreOptions, StoreResult};
use log::{error, info};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Registry key of the in-process backend.
pub const MEMORY_BACKEND: &str = "memory";
/// Registry key of the SQLite backend.
pub const SQLITE_BACKEND: &str = "sqlite";

/// Backend constructor stored in the registry.
pub type StoreConstructor = fn(&StoreOptions) -> StoreResult<Arc<dyn Store>>;

/// Backend registration/selection errors.
#[derive(Debug)]
pub enum RegistryError {
    InvalidBackendName(String),
    DuplicateBackendName(String),
    BackendNotRegistered {
        name: String,
        known: Vec<String>,
    },
    /// The backend was found but failed to start.
    Backend(StoreError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBackendName(value) => write!(f, "backend name is invalid: `{value}`"),
            Self::DuplicateBackendName(value) => {
                write!(f, "backend name already registered: {value}")
            }
            Self::BackendNotRegistered { name, known } => write!(
                f,
                "state backend `{name}` was not registered; known backends: {}",
                known.join(", ")
            ),
            Self::Backend(err) => write!(f, "backend failed to start: {err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Startup registry mapping backend names to constructors.
#[derive(Default)]
pub struct StoreRegistry {
    constructors: BTreeMap<String, StoreConstructor>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `memory` and `sqlite` backends.
    pub fn with_builtin_backends() -> Self {
        let mut registry = Self::new();
        registry.constructors.insert(MEMORY_BACKEND.to_string(), open_memory);
        registry.constructors.insert(SQLITE_BACKEND.to_string(), open_sqlite);
        registry
    }

    /// Registers one backend constructor under `name`.
    pub fn register(
        &mut self,
        name: &str,
        constructor: StoreConstructor,
    ) -> Result<(), RegistryError> {
        let name = name.trim().to_string();
        if !is_valid_backend_name(&name) {
            return Err(RegistryError::InvalidBackendName(name));
        }
        if self.constructors.contains_key(name.as_str()) {
            return Err(RegistryError::DuplicateBackendName(name));
        }

        self.constructors.insert(name, constructor);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Returns sorted backend names.
    pub fn backend_names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name.trim())
    }

    /// Constructs the backend registered under `name`.
    ///
    /// Unknown names fail here instead of handing back an unusable store.
    pub fn open(&self, name: &str, options: &StoreOptions) -> Result<Arc<dyn Store>, RegistryError> {
        let normalized = name.trim();
        let Some(constructor) = self.constructors.get(normalized) else {
            error!(
                "event=store_open module=store status=error backend={} error_code=backend_not_registered",
                normalized
            );
            return Err(RegistryError::BackendNotRegistered {
                name: normalized.to_string(),
                known: self.backend_names(),
            });
        };

        match constructor(options) {
            Ok(store) => {
                info!(
                    "event=store_open module=store status=ok backend={}",
                    store.description()
                );
                Ok(store)
            }
            Err(err) => {
                error!(
                    "event=store_open module=store status=error backend={} error_code={} error={}",
                    normalized,
                    err.code(),
                    err
                );
                Err(RegistryError::Backend(err))
            }
        }
    }
}

fn open_memory(_options: &StoreOptions) -> StoreResult<Arc<dyn Store>> {
    Ok(Arc::new(MemoryStore::new()))
}

fn open_sqlite(options: &StoreOptions) -> StoreResult<Arc<dyn Store>> {
    Ok(Arc::new(SqliteStore::open(&options.sqlite_path)?))
}

fn is_valid_backend_name(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

//! Core domain logic for the multi-tenant pages service.
//! This crate is the single source of truth for accounts, credentials,
//! page ownership and the authorization gate in front of them.

pub mod auth;
pub mod config;
pub mod crypto;
pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use auth::{AccessDenied, AuthError, AuthGate, CallContext, CallMetadata, Operation};
pub use config::CoreConfig;
pub use crypto::{encode_password, generate_id, generate_token, hash_password, verify_password};
pub use logging::{default_log_level, init_logging, init_logging_from_config, LoggingError};
pub use model::account::{Account, Session};
pub use model::page::{Page, PageSet};
pub use service::{open_service, PagesService, ServiceError};
pub use store::memory::MemoryStore;
pub use store::registry::{RegistryError, StoreRegistry};
pub use store::sqlite::SqliteStore;
pub use store::{Store, StoreError, StoreOptions, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

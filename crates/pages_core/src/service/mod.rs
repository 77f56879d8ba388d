//! Core use-case services.
//!
//! # Responsibility
//! - Implement the register/connect and page CRUD operations on top of the
//!   storage contract.
//! - Bundle the gate and the services around one shared backend.
//!
//! # Invariants
//! - Services never bypass the storage contract.
//! - Failures are typed; nothing is converted into a silent success.

pub mod account_service;
pub mod page_service;

use crate::auth::{AccessDenied, AuthError, AuthGate, CallContext, CallMetadata};
use crate::config::CoreConfig;
use crate::model::account::Session;
use crate::model::page::{Page, PageSet};
use crate::store::registry::{RegistryError, StoreRegistry};
use crate::store::{Store, StoreError};
use account_service::AccountService;
use page_service::PageService;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Error surfaced to the transport layer by every operation.
#[derive(Debug)]
pub enum ServiceError {
    /// Request fields failed validation before reaching storage.
    InvalidInput(String),
    /// The call was rejected by the authorization gate.
    Denied(AccessDenied),
    /// Storage contract failure, passed through unchanged.
    Store(StoreError),
}

impl ServiceError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Denied(reason) => reason.code(),
            Self::Store(err) => err.code(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Denied(reason) => write!(f, "{reason}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(_) => None,
            Self::Denied(reason) => Some(reason),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Denied(value)
    }
}

impl From<AuthError> for ServiceError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Denied(reason) => Self::Denied(reason),
            AuthError::Store(err) => Self::Store(err),
        }
    }
}

/// Gate plus services sharing one backend.
#[derive(Clone)]
pub struct PagesService {
    store: Arc<dyn Store>,
    gate: AuthGate,
    accounts: AccountService,
    pages: PageService,
}

impl PagesService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            gate: AuthGate::new(Arc::clone(&store)),
            accounts: AccountService::new(Arc::clone(&store)),
            pages: PageService::new(Arc::clone(&store)),
            store,
        }
    }

    /// Name of the backend in use.
    pub fn backend(&self) -> &'static str {
        self.store.description()
    }

    /// Runs the gate for a call routed by its fully qualified method name.
    pub fn authorize(
        &self,
        method: &str,
        metadata: Option<&CallMetadata>,
    ) -> Result<CallContext, ServiceError> {
        Ok(self.gate.authorize(method, metadata)?)
    }

    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Session, ServiceError> {
        self.accounts.register(name, email, password)
    }

    pub fn connect(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Session, ServiceError> {
        self.accounts.connect(identifier, password)
    }

    pub fn page_list(
        &self,
        context: &CallContext,
    ) -> Result<PageSet, ServiceError> {
        self.pages.list(context)
    }

    pub fn page_get(
        &self,
        context: &CallContext,
        id: &str,
    ) -> Result<Page, ServiceError> {
        self.pages.get(context, id)
    }

    pub fn page_create(
        &self,
        context: &CallContext,
        text: &str,
    ) -> Result<Page, ServiceError> {
        self.pages.create(context, text)
    }

    pub fn page_update(
        &self,
        context: &CallContext,
        id: &str,
        text: &str,
    ) -> Result<Page, ServiceError> {
        self.pages.update(context, id, text)
    }

    pub fn page_delete(
        &self,
        context: &CallContext,
        id: &str,
    ) -> Result<Page, ServiceError> {
        self.pages.delete(context, id)
    }
}

/// Opens the configured backend through the builtin registry.
///
/// Fails fast on an unknown backend name or a backend that cannot start.
pub fn open_service(config: &CoreConfig) -> Result<PagesService, RegistryError> {
    let registry = StoreRegistry::with_builtin_backends();
    let store = registry.open(&config.backend, &config.store_options())?;
    Ok(PagesService::new(store))
}

//! Page use-cases on behalf of a gated call.
//!
//! # Invariants
//! - Reads accept any call context.
//! - Writes require `CallContext::Authenticated`; the owner is always the
//!   resolved caller, never a request field.

use super::ServiceError;
use crate::auth::CallContext;
use crate::model::page::{Page, PageSet};
use crate::store::{Store, StoreResult};
use log::{info, warn};
use std::sync::Arc;

/// Page CRUD entry points.
#[derive(Clone)]
pub struct PageService {
    store: Arc<dyn Store>,
}

impl PageService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Lists every page.
    pub fn list(&self, _context: &CallContext) -> Result<PageSet, ServiceError> {
        Ok(PageSet::new(self.store.pages()?))
    }

    /// Gets one page by id.
    pub fn get(&self, _context: &CallContext, id: &str) -> Result<Page, ServiceError> {
        Ok(self.store.page(id)?)
    }

    /// Creates a page owned by the caller.
    pub fn create(&self, context: &CallContext, text: &str) -> Result<Page, ServiceError> {
        let account_id = context.require_account_id()?;
        logged("page_create", account_id, self.store.page_create(account_id, text))
    }

    /// Replaces the text of a page the caller owns.
    pub fn update(&self, context: &CallContext, id: &str, text: &str) -> Result<Page, ServiceError> {
        let account_id = context.require_account_id()?;
        logged(
            "page_update",
            account_id,
            self.store.page_update(id, account_id, text),
        )
    }

    /// Deletes a page the caller owns and returns it as it was.
    pub fn delete(&self, context: &CallContext, id: &str) -> Result<Page, ServiceError> {
        let account_id = context.require_account_id()?;
        logged("page_delete", account_id, self.store.page_delete(id, account_id))
    }
}

fn logged(event: &str, account_id: &str, result: StoreResult<Page>) -> Result<Page, ServiceError> {
    match result {
        Ok(page) => {
            info!(
                "event={event} module=service status=ok account_id={account_id} page_id={}",
                page.id
            );
            Ok(page)
        }
        Err(err) => {
            warn!(
                "event={event} module=service status=error account_id={account_id} error_code={}",
                err.code()
            );
            Err(err.into())
        }
    }
}

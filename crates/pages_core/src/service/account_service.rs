//! Account use-cases: register and connect.
//!
//! # Invariants
//! - Every successful call returns a freshly minted token.
//! - Name and email are trimmed before persistence; empty email or empty
//!   password is rejected before touching storage.

use super::ServiceError;
use crate::model::account::Session;
use crate::store::Store;
use log::{info, warn};
use std::sync::Arc;

/// Registration and login entry points.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates an account and returns it with its first token.
    ///
    /// The account and token are stored by one contract call, so a failure
    /// leaves no account behind and a retry is not blocked by `EmailTaken`.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<Session, ServiceError> {
        let name = name.trim();
        let email = email.trim();
        validate_credentials(email, password)?;

        match self.store.account_register(name, email, password) {
            Ok(session) => {
                info!(
                    "event=account_register module=service status=ok account_id={}",
                    session.account.id
                );
                Ok(session)
            }
            Err(err) => {
                warn!(
                    "event=account_register module=service status=error error_code={}",
                    err.code()
                );
                Err(err.into())
            }
        }
    }

    /// Authenticates by email and password and mints a new token.
    ///
    /// Under the single-token policy this revokes the previous token.
    pub fn connect(&self, identifier: &str, password: &str) -> Result<Session, ServiceError> {
        let identifier = identifier.trim();
        validate_credentials(identifier, password)?;

        let result = self.store.account_for_email(identifier).and_then(|account| {
            self.store.account_for_password(&account.id, password)?;
            let token = self.store.token_set(&account.id)?;
            // Re-read so `modified` reflects the token write.
            let account = self.store.account(&account.id)?;
            Ok(Session { account, token })
        });
        match result {
            Ok(session) => {
                info!(
                    "event=account_connect module=service status=ok account_id={}",
                    session.account.id
                );
                Ok(session)
            }
            Err(err) => {
                warn!(
                    "event=account_connect module=service status=error error_code={}",
                    err.code()
                );
                Err(err.into())
            }
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ServiceError> {
    if email.is_empty() {
        return Err(ServiceError::InvalidInput("email must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(ServiceError::InvalidInput(
            "password must not be empty".to_string(),
        ));
    }
    Ok(())
}

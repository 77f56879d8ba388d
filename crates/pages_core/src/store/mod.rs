//! Storage contract shared by every backend.
//!
//! # Responsibility
//! - Define the account/token/page operations handlers rely on.
//! - Map backend failures to one semantic error taxonomy.
//!
//! # Invariants
//! - Email is unique across accounts; a duplicate create fails and leaves
//!   nothing behind.
//! - Only the page owner may update or delete a page.
//! - One active token per account: minting a token revokes every token
//!   previously minted for that account.
//! - A resolvable token always resolves to an existing account.

use crate::db::DbError;
use crate::model::account::{Account, Session};
use crate::model::page::Page;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod memory;
pub mod registry;
pub mod sqlite;

pub type StoreResult<T> = Result<T, StoreError>;

/// Semantic error for storage contract operations.
#[derive(Debug)]
pub enum StoreError {
    AccountNotFound(String),
    PageNotFound(String),
    /// Token does not map to any account.
    InvalidToken,
    PasswordInvalid,
    /// Another account already uses this email.
    EmailTaken(String),
    /// Caller is authenticated but does not own the page.
    Unauthorized { page_id: String, account_id: String },
    Db(DbError),
    InvalidData(String),
}

impl StoreError {
    /// Stable machine-readable code for transport mapping and log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "account_not_found",
            Self::PageNotFound(_) => "page_not_found",
            Self::InvalidToken => "invalid_token",
            Self::PasswordInvalid => "password_invalid",
            Self::EmailTaken(_) => "email_taken",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
        }
    }

    /// Returns whether this error belongs to the not-found family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::PageNotFound(_) | Self::InvalidToken
        )
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccountNotFound(id) => write!(f, "account not found: {id}"),
            Self::PageNotFound(id) => write!(f, "page not found: {id}"),
            Self::InvalidToken => write!(f, "token does not match any account"),
            Self::PasswordInvalid => write!(f, "password is invalid"),
            Self::EmailTaken(email) => write!(f, "email already registered: {email}"),
            Self::Unauthorized {
                page_id,
                account_id,
            } => write!(f, "page {page_id} does not belong to account {account_id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Backend construction parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Database file used by the `sqlite` backend.
    pub sqlite_path: PathBuf,
}

/// Account and page persistence contract.
///
/// Implementations are shared across concurrently running calls, so every
/// operation must be atomic with respect to the others.
pub trait Store: Send + Sync {
    /// Short backend name, matching its registry key.
    fn description(&self) -> &'static str;

    fn account(&self, id: &str) -> StoreResult<Account>;
    fn account_for_email(&self, email: &str) -> StoreResult<Account>;
    /// Fails with `InvalidToken` when no account holds `token`.
    fn account_for_token(&self, token: &str) -> StoreResult<Account>;
    /// Fails with `PasswordInvalid` when `attempt` does not match.
    fn account_for_password(&self, id: &str, attempt: &str) -> StoreResult<Account>;
    /// Hashes `password` and creates the account. Fails with `EmailTaken`.
    fn account_create(&self, name: &str, email: &str, password: &str) -> StoreResult<Account>;
    /// Creates the account together with its first token in one atomic step.
    ///
    /// Either both are stored or neither is; the returned account already
    /// reflects the token write.
    fn account_register(&self, name: &str, email: &str, password: &str) -> StoreResult<Session>;
    /// Mints a new token for the account, revoking any previous one.
    fn token_set(&self, account_id: &str) -> StoreResult<String>;

    /// Lists every page ordered by `created`, then `id`.
    fn pages(&self) -> StoreResult<Vec<Page>>;
    fn page(&self, id: &str) -> StoreResult<Page>;
    fn page_create(&self, account_id: &str, text: &str) -> StoreResult<Page>;
    fn page_update(&self, id: &str, account_id: &str, text: &str) -> StoreResult<Page>;
    /// Removes the page and returns it as it was at removal time.
    fn page_delete(&self, id: &str, account_id: &str) -> StoreResult<Page>;
}

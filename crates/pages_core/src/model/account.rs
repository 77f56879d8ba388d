//! Account identity record.

use serde::{Deserialize, Serialize};

/// Registered account as seen by handlers.
///
/// The stored password hash is owned by the backend and not
/// part of this value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Opaque unique id.
    pub id: String,
    pub name: String,
    /// Unique across all accounts.
    pub email: String,
    /// UTC nanoseconds.
    pub created: i64,
    /// UTC nanoseconds. Bumped whenever a token is minted.
    pub modified: i64,
}

/// Result of a successful register/connect: the account plus its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account: Account,
    pub token: String,
}

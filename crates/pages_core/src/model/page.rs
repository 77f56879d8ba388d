//! Page document record.

use super::account::Account;
use serde::{Deserialize, Serialize};

/// Text document owned by exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    /// Owning account, resolved by the backend on every read.
    pub account: Account,
    pub text: String,
    /// UTC nanoseconds.
    pub created: i64,
    /// UTC nanoseconds.
    pub modified: i64,
}

impl Page {
    /// Returns whether `account_id` owns this page.
    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.account.id == account_id
    }
}

/// Page listing envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSet {
    /// Ordered by `created`, then `id`.
    pub pages: Vec<Page>,
    /// Number of pages in `pages`.
    pub total: u64,
}

impl PageSet {
    pub fn new(pages: Vec<Page>) -> Self {
        let total = pages.len() as u64;
        Self { pages, total }
    }
}

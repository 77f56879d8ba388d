//! In-process storage backend for development and tests.
//!
//! # Invariants
//! - All four mappings live behind one mutex; each contract operation takes
//!   it exactly once, so check-then-write sequences are atomic.
//! - Pages store the owner id; the owning account is resolved on read.
//! - Registration inserts the account and its first token under the same
//!   guard, so no reader sees an account without a token.

use super::registry::MEMORY_BACKEND;
use super::{Store, StoreError, StoreResult};
use crate::crypto::{generate_id, generate_token, hash_password, verify_password};
use crate::model::account::{Account, Session};
use crate::model::now_nanos;
use crate::model::page::Page;
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct PageRecord {
    id: String,
    account_id: String,
    text: String,
    created: i64,
    modified: i64,
}

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<String, Account>,
    /// token -> account id
    tokens: HashMap<String, String>,
    /// account id -> encoded password
    passwords: HashMap<String, String>,
    pages: HashMap<String, PageRecord>,
}

impl MemoryState {
    fn account(&self, id: &str) -> StoreResult<Account> {
        self.accounts
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::AccountNotFound(id.to_string()))
    }

    fn resolve_page(&self, record: &PageRecord) -> StoreResult<Page> {
        let account = self.accounts.get(&record.account_id).cloned().ok_or_else(|| {
            StoreError::InvalidData(format!(
                "page {} references missing account {}",
                record.id, record.account_id
            ))
        })?;
        Ok(Page {
            id: record.id.clone(),
            account,
            text: record.text.clone(),
            created: record.created,
            modified: record.modified,
        })
    }

    /// Stores a new account unless `email` is already taken.
    fn insert_account(&mut self, name: &str, email: &str, encoded: String) -> StoreResult<Account> {
        if self.accounts.values().any(|account| account.email == email) {
            return Err(StoreError::EmailTaken(email.to_string()));
        }

        let ts = now_nanos();
        let account = Account {
            id: generate_id(),
            name: name.to_string(),
            email: email.to_string(),
            created: ts,
            modified: ts,
        };
        self.passwords.insert(account.id.clone(), encoded);
        self.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    /// Replaces whatever token the account held with a fresh one.
    fn mint_token(&mut self, account_id: &str) -> StoreResult<String> {
        let account = self
            .accounts
            .get_mut(account_id)
            .ok_or_else(|| StoreError::AccountNotFound(account_id.to_string()))?;
        account.modified = now_nanos();

        let token = generate_token();
        self.tokens.retain(|_, owner| owner != account_id);
        self.tokens.insert(token.clone(), account_id.to_string());
        Ok(token)
    }

    fn owned_page_mut(&mut self, id: &str, account_id: &str) -> StoreResult<&mut PageRecord> {
        let record = self
            .pages
            .get_mut(id)
            .ok_or_else(|| StoreError::PageNotFound(id.to_string()))?;
        if record.account_id != account_id {
            return Err(StoreError::Unauthorized {
                page_id: id.to_string(),
                account_id: account_id.to_string(),
            });
        }
        Ok(record)
    }
}

/// Volatile backend keeping everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn description(&self) -> &'static str {
        MEMORY_BACKEND
    }

    fn account(&self, id: &str) -> StoreResult<Account> {
        self.state.lock().account(id)
    }

    fn account_for_email(&self, email: &str) -> StoreResult<Account> {
        self.state
            .lock()
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned()
            .ok_or_else(|| StoreError::AccountNotFound(email.to_string()))
    }

    fn account_for_token(&self, token: &str) -> StoreResult<Account> {
        let state = self.state.lock();
        let account_id = state.tokens.get(token).ok_or(StoreError::InvalidToken)?;
        state.account(account_id)
    }

    fn account_for_password(&self, id: &str, attempt: &str) -> StoreResult<Account> {
        let (account, encoded) = {
            let state = self.state.lock();
            let account = state.account(id)?;
            let encoded = state.passwords.get(id).cloned().ok_or_else(|| {
                StoreError::InvalidData(format!("account {id} has no stored password"))
            })?;
            (account, encoded)
        };

        // Key derivation runs outside the guard.
        if !verify_password(&encoded, attempt) {
            return Err(StoreError::PasswordInvalid);
        }
        Ok(account)
    }

    fn account_create(&self, name: &str, email: &str, password: &str) -> StoreResult<Account> {
        let encoded = hash_password(password);
        let account = self.state.lock().insert_account(name, email, encoded)?;
        debug!(
            "event=account_create module=store backend=memory status=ok account_id={}",
            account.id
        );
        Ok(account)
    }

    fn account_register(&self, name: &str, email: &str, password: &str) -> StoreResult<Session> {
        let encoded = hash_password(password);
        let mut state = self.state.lock();
        let account = state.insert_account(name, email, encoded)?;
        // A fresh account holds no token yet, so nothing needs revoking.
        let token = generate_token();
        state.tokens.insert(token.clone(), account.id.clone());
        debug!(
            "event=account_register module=store backend=memory status=ok account_id={}",
            account.id
        );
        Ok(Session { account, token })
    }

    fn token_set(&self, account_id: &str) -> StoreResult<String> {
        self.state.lock().mint_token(account_id)
    }

    fn pages(&self) -> StoreResult<Vec<Page>> {
        let state = self.state.lock();
        let mut records: Vec<&PageRecord> = state.pages.values().collect();
        records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        records
            .into_iter()
            .map(|record| state.resolve_page(record))
            .collect()
    }

    fn page(&self, id: &str) -> StoreResult<Page> {
        let state = self.state.lock();
        let record = state
            .pages
            .get(id)
            .ok_or_else(|| StoreError::PageNotFound(id.to_string()))?;
        state.resolve_page(record)
    }

    fn page_create(&self, account_id: &str, text: &str) -> StoreResult<Page> {
        let mut state = self.state.lock();
        let account = state.account(account_id)?;

        let ts = now_nanos();
        let record = PageRecord {
            id: generate_id(),
            account_id: account.id.clone(),
            text: text.to_string(),
            created: ts,
            modified: ts,
        };
        let page = Page {
            id: record.id.clone(),
            account,
            text: record.text.clone(),
            created: ts,
            modified: ts,
        };
        state.pages.insert(record.id.clone(), record);
        Ok(page)
    }

    fn page_update(&self, id: &str, account_id: &str, text: &str) -> StoreResult<Page> {
        let mut state = self.state.lock();
        let record = state.owned_page_mut(id, account_id)?;
        record.text = text.to_string();
        record.modified = now_nanos();
        let record = record.clone();
        state.resolve_page(&record)
    }

    fn page_delete(&self, id: &str, account_id: &str) -> StoreResult<Page> {
        let mut state = self.state.lock();
        let record = state.owned_page_mut(id, account_id)?.clone();
        let page = state.resolve_page(&record)?;
        state.pages.remove(id);
        Ok(page)
    }
}

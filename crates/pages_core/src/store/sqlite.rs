//! SQLite-backed storage implementation.
//!
//! # Responsibility
//! - Persist accounts and pages in the `account` and `page` tables.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every contract operation is a single statement or one transaction.
//! - "No row" maps to the not-found family, never to a driver error.
//! - `account.token` holds the only valid token for that account; the empty
//!   default never authenticates.
//! - The owner column of a page is never rewritten.
//! - Listings resolve every owner in the same JOIN that reads the pages.

use super::registry::SQLITE_BACKEND;
use super::{Store, StoreError, StoreResult};
use crate::crypto::{generate_id, generate_token, hash_password, verify_password};
use crate::db::{open_db, open_db_in_memory};
use crate::model::account::{Account, Session};
use crate::model::now_nanos;
use crate::model::page::Page;
use log::debug;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;

const ACCOUNT_SELECT_SQL: &str = "SELECT id, name, email, created, modified FROM account";

const PAGE_WITH_ACCOUNT_SQL: &str = "SELECT
    p.id AS page_id,
    p.text AS page_text,
    p.created AS page_created,
    p.modified AS page_modified,
    a.id AS id,
    a.name AS name,
    a.email AS email,
    a.created AS created,
    a.modified AS modified
FROM page p
INNER JOIN account a ON a.id = p.account";

/// Durable backend over one SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_migrated(open_db(path)?))
    }

    /// Opens a private in-memory database with the full schema.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_migrated(open_db_in_memory()?))
    }

    fn from_migrated(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl Store for SqliteStore {
    fn description(&self) -> &'static str {
        SQLITE_BACKEND
    }

    fn account(&self, id: &str) -> StoreResult<Account> {
        let conn = self.conn.lock();
        query_account(&conn, AccountKey::Id, id)?
            .ok_or_else(|| StoreError::AccountNotFound(id.to_string()))
    }

    fn account_for_email(&self, email: &str) -> StoreResult<Account> {
        let conn = self.conn.lock();
        query_account(&conn, AccountKey::Email, email)?
            .ok_or_else(|| StoreError::AccountNotFound(email.to_string()))
    }

    fn account_for_token(&self, token: &str) -> StoreResult<Account> {
        if token.is_empty() {
            return Err(StoreError::InvalidToken);
        }
        let conn = self.conn.lock();
        query_account(&conn, AccountKey::Token, token)?.ok_or(StoreError::InvalidToken)
    }

    fn account_for_password(&self, id: &str, attempt: &str) -> StoreResult<Account> {
        let found = {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT id, name, email, created, modified, password FROM account WHERE id = ?1;",
                [id],
                |row| Ok((parse_account_row(row)?, row.get::<_, String>("password")?)),
            )
            .optional()?
        };
        let (account, encoded) = found.ok_or_else(|| StoreError::AccountNotFound(id.to_string()))?;

        // Key derivation runs outside the connection guard.
        if !verify_password(&encoded, attempt) {
            return Err(StoreError::PasswordInvalid);
        }
        Ok(account)
    }

    fn account_create(&self, name: &str, email: &str, password: &str) -> StoreResult<Account> {
        let encoded = hash_password(password);
        let conn = self.conn.lock();
        let account = insert_account(&conn, name, email, &encoded, "")?;
        debug!(
            "event=account_create module=store backend=sqlite status=ok account_id={}",
            account.id
        );
        Ok(account)
    }

    fn account_register(&self, name: &str, email: &str, password: &str) -> StoreResult<Session> {
        let encoded = hash_password(password);
        let token = generate_token();
        let conn = self.conn.lock();
        // Account row and token land in one INSERT.
        let account = insert_account(&conn, name, email, &encoded, &token)?;
        debug!(
            "event=account_register module=store backend=sqlite status=ok account_id={}",
            account.id
        );
        Ok(Session { account, token })
    }

    fn token_set(&self, account_id: &str) -> StoreResult<String> {
        let token = generate_token();
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE account SET token = ?1, modified = ?2 WHERE id = ?3;",
            params![token.as_str(), now_nanos(), account_id],
        )?;
        if changed == 0 {
            return Err(StoreError::AccountNotFound(account_id.to_string()));
        }
        Ok(token)
    }

    fn pages(&self) -> StoreResult<Vec<Page>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "{PAGE_WITH_ACCOUNT_SQL} ORDER BY p.created ASC, p.id ASC;"
        ))?;
        let pages = stmt
            .query_map([], parse_page_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    fn page(&self, id: &str) -> StoreResult<Page> {
        let conn = self.conn.lock();
        query_page(&conn, id)?.ok_or_else(|| StoreError::PageNotFound(id.to_string()))
    }

    fn page_create(&self, account_id: &str, text: &str) -> StoreResult<Page> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let account = query_account(&tx, AccountKey::Id, account_id)?
            .ok_or_else(|| StoreError::AccountNotFound(account_id.to_string()))?;

        let ts = now_nanos();
        let page = Page {
            id: generate_id(),
            account,
            text: text.to_string(),
            created: ts,
            modified: ts,
        };
        tx.execute(
            "INSERT INTO page (id, account, text, created, modified)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                page.id.as_str(),
                page.account.id.as_str(),
                page.text.as_str(),
                page.created,
                page.modified,
            ],
        )?;
        tx.commit()?;
        Ok(page)
    }

    fn page_update(&self, id: &str, account_id: &str, text: &str) -> StoreResult<Page> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_page_owner(&tx, id, account_id)?;

        tx.execute(
            "UPDATE page SET text = ?1, modified = ?2 WHERE id = ?3;",
            params![text, now_nanos(), id],
        )?;
        let page = query_page(&tx, id)?.ok_or_else(|| StoreError::PageNotFound(id.to_string()))?;
        tx.commit()?;
        Ok(page)
    }

    fn page_delete(&self, id: &str, account_id: &str) -> StoreResult<Page> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_page_owner(&tx, id, account_id)?;

        let page = query_page(&tx, id)?.ok_or_else(|| StoreError::PageNotFound(id.to_string()))?;
        tx.execute("DELETE FROM page WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(page)
    }
}

#[derive(Debug, Clone, Copy)]
enum AccountKey {
    Id,
    Email,
    Token,
}

impl AccountKey {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
            Self::Token => "token",
        }
    }
}

fn query_account(conn: &Connection, key: AccountKey, value: &str) -> StoreResult<Option<Account>> {
    let sql = format!("{ACCOUNT_SELECT_SQL} WHERE {} = ?1;", key.column());
    let account = conn
        .query_row(&sql, [value], parse_account_row)
        .optional()?;
    Ok(account)
}

fn query_page(conn: &Connection, id: &str) -> StoreResult<Option<Page>> {
    let page = conn
        .query_row(
            &format!("{PAGE_WITH_ACCOUNT_SQL} WHERE p.id = ?1;"),
            [id],
            parse_page_row,
        )
        .optional()?;
    Ok(page)
}

fn insert_account(
    conn: &Connection,
    name: &str,
    email: &str,
    encoded_password: &str,
    token: &str,
) -> StoreResult<Account> {
    let ts = now_nanos();
    let account = Account {
        id: generate_id(),
        name: name.to_string(),
        email: email.to_string(),
        created: ts,
        modified: ts,
    };

    let inserted = conn.execute(
        "INSERT INTO account (id, name, email, password, token, created, modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            account.id.as_str(),
            account.name.as_str(),
            account.email.as_str(),
            encoded_password,
            token,
            account.created,
            account.modified,
        ],
    );
    match inserted {
        Ok(_) => Ok(account),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(StoreError::EmailTaken(email.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

fn ensure_page_owner(conn: &Connection, id: &str, account_id: &str) -> StoreResult<()> {
    let owner: Option<String> = conn
        .query_row("SELECT account FROM page WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .optional()?;

    match owner {
        None => Err(StoreError::PageNotFound(id.to_string())),
        Some(owner) if owner != account_id => Err(StoreError::Unauthorized {
            page_id: id.to_string(),
            account_id: account_id.to_string(),
        }),
        Some(_) => Ok(()),
    }
}

fn parse_page_row(row: &Row<'_>) -> rusqlite::Result<Page> {
    Ok(Page {
        id: row.get("page_id")?,
        text: row.get("page_text")?,
        created: row.get("page_created")?,
        modified: row.get("page_modified")?,
        account: parse_account_row(row)?,
    })
}

fn parse_account_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created: row.get("created")?,
        modified: row.get("modified")?,
    })
}

//! Session token and record id generation.

use super::random_letters;
use crate::model::now_nanos;
use sha2::{Digest, Sha256};
use uuid::Uuid;

const TOKEN_SALT_LEN: usize = 12;

/// Mints a new opaque session token.
///
/// SHA-256 over the current nanosecond clock reading and a random salt,
/// hex encoded (64 chars).
pub fn generate_token() -> String {
    let mut hasher = Sha256::new();
    hasher.update(now_nanos().to_string().as_bytes());
    hasher.update(random_letters(TOKEN_SALT_LEN).as_bytes());
    hex::encode(hasher.finalize())
}

/// Generates a unique record id for accounts and pages.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

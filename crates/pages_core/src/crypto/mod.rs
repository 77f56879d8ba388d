//! Credential codec: password hashing, token and id generation.
//!
//! # Responsibility
//! - Turn plaintext passwords into storable, verifiable encodings.
//! - Mint opaque session tokens and record ids.
//!
//! # Invariants
//! - Plaintext passwords and tokens never reach the log.
//! - Verification fails closed on any malformed encoding.

mod password;
mod token;

pub use password::{
    encode_password, hash_password, verify_password, PASSWORD_ALGORITHM, PASSWORD_ITERATIONS,
    PASSWORD_SALT_LEN,
};
pub use token::{generate_id, generate_token};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns a random string of ASCII letters.
///
/// The alphabet never contains the `$` field delimiter used by password
/// encodings.
pub fn random_letters(len: usize) -> String {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

/// Constant-time byte comparison.
///
/// Runtime depends only on the input lengths, never on where the first
/// mismatching byte sits.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

//! PBKDF2-SHA256 password encoding.
//!
//! Encoded form: `<algorithm>$<iterations>$<salt>$<base64(derived_key)>`.

use super::{constant_time_eq, random_letters};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use sha2::Sha256;

/// Algorithm tag written into every encoding produced by this crate.
pub const PASSWORD_ALGORITHM: &str = "pbkdf2_sha256";
/// PBKDF2 round count for newly hashed passwords.
pub const PASSWORD_ITERATIONS: u32 = 12_000;
/// Salt length (ASCII letters) for newly hashed passwords.
pub const PASSWORD_SALT_LEN: usize = 12;

const FIELD_DELIMITER: char = '$';
const DERIVED_KEY_LEN: usize = 32;

/// Hashes a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = random_letters(PASSWORD_SALT_LEN);
    encode_password(PASSWORD_ALGORITHM, PASSWORD_ITERATIONS, &salt, password)
}

/// Encodes a password with explicit parameters.
///
/// Deterministic for identical inputs. `salt` must not contain `$`.
pub fn encode_password(algorithm: &str, iterations: u32, salt: &str, password: &str) -> String {
    let key = derive_key(password, salt, iterations);
    format!(
        "{algorithm}{d}{iterations}{d}{salt}{d}{}",
        STANDARD.encode(key),
        d = FIELD_DELIMITER
    )
}

/// Checks `attempt` against a stored encoding.
///
/// Returns `false` for any encoding that does not parse: wrong field count,
/// unknown algorithm, zero or non-numeric iterations, or a key that is not
/// valid base64 of the expected length.
pub fn verify_password(encoded: &str, attempt: &str) -> bool {
    let fields: Vec<&str> = encoded.split(FIELD_DELIMITER).collect();
    let [algorithm, iterations, salt, stored_key] = fields.as_slice() else {
        return false;
    };
    if *algorithm != PASSWORD_ALGORITHM {
        return false;
    }
    let iterations = match iterations.parse::<u32>() {
        Ok(value) if value > 0 => value,
        _ => return false,
    };
    let stored_key = match STANDARD.decode(stored_key) {
        Ok(bytes) if bytes.len() == DERIVED_KEY_LEN => bytes,
        _ => return false,
    };

    let attempt_key = derive_key(attempt, salt, iterations);
    constant_time_eq(&attempt_key, &stored_key)
}

fn derive_key(password: &str, salt: &str, iterations: u32) -> [u8; DERIVED_KEY_LEN] {
    let mut key = [0u8; DERIVED_KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut key);
    key
}

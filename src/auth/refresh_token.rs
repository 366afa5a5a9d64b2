/// Refresh Token Hashing
///
/// Refresh tokens are stored only as `base64(salt)$base64(sha256(salt || token))`.
/// The plaintext is handed to the caller once and never persisted.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_LEN: usize = 16;

fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

fn digest(token: &str, salt: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Hash a refresh token with a fresh random salt
pub fn hash_refresh_token(token: &str) -> String {
    let salt = generate_salt();
    let hash = digest(token, &salt);
    format!("{}${}", STANDARD_NO_PAD.encode(salt), STANDARD_NO_PAD.encode(hash))
}

/// Check a presented refresh token against a stored hash
///
/// Returns false for malformed stored values.
pub fn verify_refresh_token(token: &str, stored: &str) -> bool {
    let Some((salt_b64, hash_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (
        STANDARD_NO_PAD.decode(salt_b64),
        STANDARD_NO_PAD.decode(hash_b64),
    ) else {
        return false;
    };

    constant_time_eq(&digest(token, &salt), &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

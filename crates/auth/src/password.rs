//! Argon2 password hashing for locally stored credentials.

use std::sync::OnceLock;

use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PasswordError {
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hash `password` into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }

    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Hashing(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Hashing(e.to_string()))?;

    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hashing(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Check `password` against a stored PHC hash.
///
/// A hash that does not parse never verifies.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

const DECOY_PASSWORD: &str = "decoy password, never stored";

/// A real PHC hash that belongs to nobody, computed once per process.
pub fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceLock<Option<String>> = OnceLock::new();
    DECOY.get_or_init(|| hash_password(DECOY_PASSWORD).ok()).as_deref()
}

/// Spend one verification on the decoy hash and report failure.
///
/// Used when there is no stored hash to check, so that an unknown account
/// costs the caller as much as a wrong password.
pub fn verify_decoy(password: &str) -> bool {
    if let Some(hash) = decoy_hash() {
        let _ = verify_password(hash, password);
    }
    false
}

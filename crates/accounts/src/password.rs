//! Password hashing and verification (Argon2id, PHC string format).

use std::sync::OnceLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::AccountError;

/// Hash a password using default Argon2 settings and a random salt.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::PasswordHash(e.to_string()))
}

/// Verify a password against a stored PHC string. An unparsable hash never
/// verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .is_ok()
}

/// Burn one Argon2 verification for a login whose email matched no user, so
/// that path costs the same as a wrong password. Always `false`.
pub fn verify_against_dummy(password: &str) -> bool {
    match dummy_hash() {
        Some(hash) => {
            let _ = verify_password(password, hash);
        }
        None => tracing::warn!("dummy password hash unavailable"),
    }
    false
}

/// Hash of a random secret nobody knows, computed once per process with the
/// same parameters as stored hashes.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| {
            let secret = SaltString::generate(&mut OsRng);
            hash_password(secret.as_str()).ok()
        })
        .as_deref()
}

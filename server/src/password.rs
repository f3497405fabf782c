//! Password hashing.
//!
//! Argon2id with per-password random salts. Only the encoded hash string
//! is ever stored; verification failures and malformed hashes both report
//! a mismatch so callers can map them to one generic credentials error.

use crate::error::{ApiError, Result};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::Argon2;

/// Hash a plaintext password with Argon2id.
///
/// # Errors
///
/// Returns `ApiError::Internal` if hashing fails (effectively never with
/// default parameters).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| ApiError::Internal(format!("Password hashing failed: {err}")))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against an encoded Argon2 hash.
///
/// Returns `false` for mismatches and for unparseable hashes.
#[must_use]
pub fn verify_password(password: &str, encoded_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(encoded_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_verifies() {
        let hash = hash_password("password1").unwrap_or_default();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password1", &hash));
        assert!(!verify_password("password2", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let first = hash_password("password1").unwrap_or_default();
        let second = hash_password("password1").unwrap_or_default();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("password1", "not-a-hash"));
        assert!(!verify_password("password1", ""));
    }
}

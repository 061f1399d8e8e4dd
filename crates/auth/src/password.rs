//! Password hashing.
//!
//! The upstream service compared plain-text passwords; credentials here are
//! stored as Argon2id hashes instead. Observable login behavior is
//! unchanged.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    HashingFailed,
}

/// Hash a password using Argon2id with a fresh salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| PasswordError::HashingFailed)
}

/// Verify a password against its stored hash.
/// An unparseable hash verifies as false rather than erroring; the caller
/// only ever needs a yes/no answer.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("pw1").unwrap();

        assert!(verify_password("pw1", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("pw1").unwrap();
        let second = hash_password("pw1").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_garbage_hash_verifies_false() {
        assert!(!verify_password("pw1", "not-a-phc-string"));
    }
}

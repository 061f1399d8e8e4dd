//! In-memory user registry.
//!
//! Append-only: accounts are never updated or removed. Usernames compare
//! case-sensitively. Passwords are stored as Argon2id hashes. A single
//! `RwLock` keeps the availability check and the append atomic under
//! concurrent registrations.

use std::sync::RwLock;

use thiserror::Error;

use bookshop_auth::{hash_password, verify_password};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Username and password are required")]
    InvalidInput,

    #[error("Username already exists")]
    Conflict,

    #[error("failed to hash credentials")]
    Hashing,
}

struct UserAccount {
    username: String,
    password_hash: String,
}

pub struct AccountRegistry {
    users: RwLock<Vec<UserAccount>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }

    /// True iff no existing account holds this exact username
    pub fn is_available(&self, username: &str) -> bool {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        !users.iter().any(|user| user.username == username)
    }

    /// Register a new account. Blank fields are invalid input; a taken
    /// username is a conflict regardless of password.
    pub fn register(&self, username: &str, password: &str) -> Result<(), RegisterError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(RegisterError::InvalidInput);
        }

        let password_hash = hash_password(password).map_err(|_| RegisterError::Hashing)?;

        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        if users.iter().any(|user| user.username == username) {
            return Err(RegisterError::Conflict);
        }

        users.push(UserAccount {
            username: username.to_string(),
            password_hash,
        });

        Ok(())
    }

    /// True iff an account exists with this exact username and a matching
    /// password
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        users
            .iter()
            .find(|user| user.username == username)
            .is_some_and(|user| verify_password(password, &user.password_hash))
    }
}

impl Default for AccountRegistry {
    fn default() -> Self {
        Self::new()
    }
}

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::collections::HashMap;

use crate::core::error::{AppError, Result};

/// Registered users and their argon2 password hashes
///
/// Filled once at startup and read-only afterwards.
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Build a store holding a single user
    pub fn with_user(username: &str, password: &str) -> Result<Self> {
        let mut store = Self {
            users: HashMap::new(),
        };
        store.add_user(username, password)?;
        Ok(store)
    }

    /// Register a user, replacing the password of an existing one
    pub fn add_user(&mut self, username: &str, password: &str) -> Result<()> {
        self.users
            .insert(username.to_string(), hash_password(password)?);
        Ok(())
    }

    /// True iff the user exists and the password matches its hash
    ///
    /// Callers must not tell an unknown user apart from a wrong password.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|hash| verify_password(password, hash))
    }

    pub fn contains(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }
}

/// Hash a password using Argon2
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verify a password against a hash
fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

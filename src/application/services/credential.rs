//! Credential Service
//!
//! Password hashing and verification. The rest of the system only ever
//! sees the opaque hash string; plaintext never leaves this boundary.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Credential errors
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Stored password hash is malformed: {0}")]
    Malformed(String),
}

/// Hashes and verifies passwords using Argon2id.
#[derive(Debug, Default, Clone)]
pub struct CredentialHasher;

impl CredentialHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hash(e.to_string()))
    }

    /// Verify a plaintext password against a stored hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| CredentialError::Malformed(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

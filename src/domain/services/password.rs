use std::str::FromStr;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use tracing::error;
use crate::error::AppError;

/// How new password hashes are produced. Verification accepts either form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordScheme {
    /// Single SHA-256 over `password + username + secret`. Weak, kept for
    /// compatibility with hashes already on disk.
    Sha256,
    Argon2,
}

impl FromStr for PasswordScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sha256" | "legacy" => Ok(PasswordScheme::Sha256),
            "argon2" => Ok(PasswordScheme::Argon2),
            other => Err(format!("unknown password scheme '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialHasher {
    secret: String,
    scheme: PasswordScheme,
}

impl CredentialHasher {
    pub fn new(secret: impl Into<String>, scheme: PasswordScheme) -> Self {
        Self { secret: secret.into(), scheme }
    }

    /// The salt is re-derived from the (normalized) username, never stored.
    pub fn derive_salt(&self, username: &str) -> String {
        format!("{}{}", username, self.secret)
    }

    pub fn hash(&self, username: &str, password: &str) -> Result<String, AppError> {
        match self.scheme {
            PasswordScheme::Sha256 => Ok(self.sha256_hex(username, password)),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut OsRng);
                Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map(|h| h.to_string())
                    .map_err(|e| {
                        error!("Argon2 hashing failed: {}", e);
                        AppError::Internal
                    })
            }
        }
    }

    pub fn verify(&self, username: &str, password: &str, stored_hash: &str) -> bool {
        if stored_hash.starts_with("$argon2") {
            return match PasswordHash::new(stored_hash) {
                Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
                Err(_) => false,
            };
        }
        self.sha256_hex(username, password) == stored_hash
    }

    fn sha256_hex(&self, username: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hasher.update(self.derive_salt(username).as_bytes());
        hex::encode(hasher.finalize())
    }
}

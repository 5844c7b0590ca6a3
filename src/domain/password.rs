//! Password value object - Domain layer password handling.
//!
//! Encapsulates bcrypt hashing and verification behind a small value
//! object so the configured work factor lives in exactly one place.

use crate::config::BCRYPT_COST;
use crate::errors::{AppError, AppResult};

/// Password value object that handles hashing and verification.
#[derive(Clone)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Create a new password by hashing the plain text with bcrypt.
    ///
    /// # Errors
    /// Returns a validation error if the password is empty, or an internal
    /// error if hashing itself fails.
    pub fn new(plain_text: &str) -> AppResult<Self> {
        if plain_text.is_empty() {
            return Err(AppError::validation("Некорректный email или password"));
        }

        let hash = bcrypt::hash(plain_text, BCRYPT_COST).map_err(|e| {
            tracing::error!("Password hash failed: {}", e);
            AppError::internal("Внутренняя ошибка сервера")
        })?;
        Ok(Self { hash })
    }

    /// Create a Password from an existing hash (from database).
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text password against this hash.
    ///
    /// Malformed stored hashes verify as false rather than erroring, so a
    /// corrupt record behaves like a wrong password.
    pub fn verify(&self, plain_text: &str) -> bool {
        bcrypt::verify(plain_text, &self.hash).unwrap_or(false)
    }
}

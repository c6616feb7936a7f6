//! Random short identifier generation.
//!
//! Identifiers are drawn from the OS entropy source and rendered over a
//! 64-symbol URL-safe alphabet. The generator knows nothing about
//! collisions; uniqueness is enforced by the record store.

use crate::error::AppError;
use serde_json::json;

/// URL-safe alphabet; 64 symbols so every random byte maps without bias.
pub const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Default identifier length: 64^7, about 4.4 trillion identifiers.
pub const DEFAULT_ID_LENGTH: usize = 7;

/// Produces fixed-length random identifiers.
#[cfg_attr(test, mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// Generates a new identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::TransientFailure`] if the entropy source fails.
    fn generate(&self) -> Result<String, AppError>;
}

/// [`IdGenerator`] backed by `getrandom`.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> Result<String, AppError> {
        let mut buffer = vec![0u8; self.length];

        getrandom::fill(&mut buffer).map_err(|e| {
            AppError::transient(
                "Failed to read from entropy source",
                json!({ "reason": e.to_string() }),
            )
        })?;

        Ok(buffer
            .iter()
            .map(|b| ALPHABET[(b & 0x3f) as usize] as char)
            .collect())
    }
}

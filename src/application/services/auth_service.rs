//! Authentication service for API key validation.

use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::error::AppError;

/// Service for authenticating API requests via Bearer keys.
///
/// Only SHA-256 digests of the configured keys are kept in memory; presented
/// keys are hashed the same way before comparison.
pub struct AuthService {
    key_hashes: HashSet<String>,
}

impl AuthService {
    /// Creates a service accepting any of `api_keys`. Blank keys are ignored.
    pub fn new<I, S>(api_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            key_hashes: api_keys
                .into_iter()
                .map(|k| k.as_ref().trim().to_string())
                .filter(|k| !k.is_empty())
                .map(|k| hash_key(&k))
                .collect(),
        }
    }

    /// Number of accepted keys.
    pub fn key_count(&self) -> usize {
        self.key_hashes.len()
    }

    /// Checks a raw key against the configured ones.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the key is not accepted.
    pub fn authenticate(&self, key: &str) -> Result<(), AppError> {
        if self.key_hashes.contains(&hash_key(key)) {
            return Ok(());
        }

        Err(AppError::unauthorized(
            "Unauthorized",
            json!({"reason": "Invalid API key"}),
        ))
    }
}

/// Lowercase hex SHA-256 of a key.
fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

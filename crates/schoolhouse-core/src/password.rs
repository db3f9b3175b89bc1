use anyhow::Context;
use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .context("Failed to hash password")
        .map_err(AppError::internal)
}

/// Checks `password` against a stored bcrypt hash.
///
/// A malformed hash is an internal error, not a failed match.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed)
        .context("Failed to verify password")
        .map_err(AppError::internal)
}

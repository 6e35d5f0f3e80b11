//! Password hashing with bcrypt.

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
/// A malformed stored hash is an internal error, not a mismatch.
pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed)
        .context("Failed to verify password")
        .map_err(AppError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_hash_and_verify() {
        let hashed = hash_password("correct horse").unwrap();
        assert_ne!(hashed, "correct horse");
        assert!(hashed.starts_with("$2"));
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("battery staple", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("secret123").unwrap();
        let second = hash_password("secret123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_internal_error() {
        let err = verify_password("secret123", "not-a-bcrypt-hash").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }
}

use actix_web::web;
use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use secrecy::{ExposeSecret, SecretString};

use crate::errors::AppError;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    verify(password, hash).unwrap_or(false)
}

/// Hashes on the blocking thread pool so request workers stay free.
pub async fn hash_password_blocking(password: SecretString) -> Result<String, AppError> {
    web::block(move || hash_password(password.expose_secret()))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

pub async fn verify_password_blocking(password: SecretString, hash: String) -> Result<bool, AppError> {
    web::block(move || verify_password(password.expose_secret(), &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hashed = hash_password("password123").unwrap();
        assert_ne!(hashed, "password123");
        assert!(verify_password("password123", &hashed));
        assert!(!verify_password("password124", &hashed));
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!verify_password("password123", "not-a-bcrypt-hash"));
    }

    #[actix_web::test]
    async fn blocking_pool_hash_round_trips() {
        let hashed = hash_password_blocking(SecretString::new("password123".into()))
            .await
            .unwrap();
        assert!(verify_password_blocking(SecretString::new("password123".into()), hashed.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking(SecretString::new("wrong-pass".into()), hashed)
            .await
            .unwrap());
    }
}

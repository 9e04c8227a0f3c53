//! services/api/src/adapters/password.rs
//!
//! Argon2 implementation of the `PasswordHasher` port.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use async_trait::async_trait;
use medilog_core::ports::{PasswordHasher, PortError, PortResult};
use tracing::error;

#[derive(Clone, Default)]
pub struct Argon2Hasher;

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, password: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("Failed to hash password: {:?}", e);
                PortError::Unexpected("Failed to hash password".to_string())
            })
    }

    async fn verify(&self, password: &str, hashed_password: &str) -> PortResult<bool> {
        let parsed_hash = PasswordHash::new(hashed_password).map_err(|e| {
            error!("Failed to parse password hash: {:?}", e);
            PortError::Unexpected("Authentication error".to_string())
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_only_the_hashed_password() {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("correct horse").await.unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("correct horse", &hash).await.unwrap());
        assert!(!hasher.verify("wrong", &hash).await.unwrap());
        assert!(hasher.verify("x", "not-a-hash").await.is_err());
    }
}

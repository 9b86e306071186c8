//! Password hashing with Argon2id
//!
//! Hashing is CPU bound, so both operations run on the blocking pool.

use std::sync::OnceLock;

use anyhow::{Result, anyhow};
use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};

/// Memory cost in KiB
const MEMORY_COST: u32 = 19 * 1024;
/// Number of passes
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Fixed salt for the stand-in hash checked when no user matches a login
const DUMMY_SALT: &str = "a2FsZW5kYWR1bW15c2FsdA";
const DUMMY_PASSWORD: &str = "kalenda-dummy-password";

fn hasher() -> Result<Argon2<'static>> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, None)
        .map_err(|e| anyhow!("Invalid Argon2 parameters: {}", e))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password into a PHC string
pub async fn hash_password(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let hash = hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    })
    .await
    .map_err(|e| anyhow!("Password hashing task failed: {}", e))?
}

/// Check a plaintext password against a stored PHC string
pub async fn verify_password(password: String, password_hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow!("Failed to parse password hash: {}", e))?;
        Ok(hasher()?
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| anyhow!("Password verification task failed: {}", e))?
}

/// PHC string with the production parameters that matches no real user
fn dummy_hash() -> Result<&'static str> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash.as_str());
    }

    let salt = SaltString::from_b64(DUMMY_SALT)
        .map_err(|e| anyhow!("Invalid dummy salt: {}", e))?;
    let hash = hasher()?
        .hash_password(DUMMY_PASSWORD.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to build dummy hash: {}", e))?
        .to_string();

    Ok(DUMMY_HASH.get_or_init(|| hash).as_str())
}

/// Compute the dummy hash ahead of the first login
pub async fn prepare_dummy_hash() -> Result<()> {
    tokio::task::spawn_blocking(|| dummy_hash().map(|_| ()))
        .await
        .map_err(|e| anyhow!("Dummy hash task failed: {}", e))?
}

/// Spend the same Argon2 work as a real verification when the login id
/// is unknown, so response time does not reveal whether the id exists
pub async fn verify_against_dummy(password: String) -> Result<()> {
    let hash = tokio::task::spawn_blocking(|| dummy_hash().map(str::to_string))
        .await
        .map_err(|e| anyhow!("Dummy hash task failed: {}", e))??;

    verify_password(password, hash).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_verifies_only_the_original_password() {
        let hash = hash_password("Secret123".to_string()).await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Secret123"));
        assert!(verify_password("Secret123".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("secret123".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let first = hash_password("Secret123".to_string()).await.unwrap();
        let second = hash_password("Secret123".to_string()).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn garbage_hash_is_an_error() {
        assert!(verify_password("x".to_string(), "plaintext".to_string()).await.is_err());
    }

    #[test]
    fn dummy_hash_uses_production_parameters() {
        let hash = dummy_hash().unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
        assert_eq!(dummy_hash().unwrap(), hash);
    }

    #[tokio::test]
    async fn dummy_verification_does_real_work() {
        prepare_dummy_hash().await.unwrap();
        verify_against_dummy("Secret123".to_string()).await.unwrap();

        let hash = dummy_hash().unwrap().to_string();
        assert!(!verify_password("Secret123".to_string(), hash.clone()).await.unwrap());
        assert!(verify_password(DUMMY_PASSWORD.to_string(), hash).await.unwrap());
    }
}

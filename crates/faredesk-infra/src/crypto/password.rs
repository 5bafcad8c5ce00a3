//! Argon2id password hashing adapter.
//!
//! Implements the `PasswordHasher` trait from `faredesk-core` using
//! argon2 with PHC string encoding (salt and parameters travel inside
//! the stored hash).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};

/// Argon2id-backed implementation of the core `PasswordHasher` trait.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl faredesk_core::service::password::PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| format!("password hashing failed: {e}"))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faredesk_core::service::password::PasswordHasher;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("hunter22").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("hunter22", &hash));
        assert!(!hasher.verify("wrong-password", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = Argon2PasswordHasher::new();
        let a = hasher.hash("hunter22").unwrap();
        let b = hasher.hash("hunter22").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_garbage_hash() {
        let hasher = Argon2PasswordHasher::new();
        assert!(!hasher.verify("hunter22", "not-a-phc-string"));
    }
}

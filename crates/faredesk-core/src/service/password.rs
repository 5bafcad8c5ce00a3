//! PasswordHasher trait for credential hashing.
//!
//! Defined in faredesk-core so the auth service can hash and verify
//! passwords without coupling to a specific algorithm. The
//! `Argon2PasswordHasher` adapter lives in faredesk-infra.

/// Abstraction over password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into a storable string (PHC format).
    fn hash(&self, password: &str) -> Result<String, String>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

//! Account registration and credential verification.
//!
//! Token issuance and verification are HTTP-boundary concerns and live
//! in the API layer; this service only deals in accounts and passwords.

use chrono::Utc;
use faredesk_types::error::{AuthError, RepositoryError};
use faredesk_types::user::{LoginRequest, RegisterRequest, User, UserId, UserRole};

use crate::repository::user::UserRepository;
use crate::service::password::PasswordHasher;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// Service handling registration, login, and account lookup.
pub struct AuthService<U: UserRepository, P: PasswordHasher> {
    user_repo: U,
    hasher: P,
}

impl<U: UserRepository, P: PasswordHasher> AuthService<U, P> {
    pub fn new(user_repo: U, hasher: P) -> Self {
        Self { user_repo, hasher }
    }

    /// Register a new account with role `user`.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let email = request.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AuthError::Validation("invalid email address".to_string()));
        }
        if request.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let password_hash = self
            .hasher
            .hash(&request.password)
            .map_err(AuthError::Storage)?;

        let user = User {
            id: UserId::new(),
            email: email.clone(),
            password_hash,
            role: UserRole::User,
            name: request.name.trim().to_string(),
            created_at: Utc::now(),
        };

        self.user_repo.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::EmailTaken(email.clone()),
            other => AuthError::Storage(other.to_string()),
        })
    }

    /// Verify credentials and return the account.
    ///
    /// An unknown email and a wrong password are indistinguishable to
    /// the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<User, AuthError> {
        let email = request.email.trim().to_lowercase();

        let user = self
            .user_repo
            .get_by_email(&email)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(&request.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Get an account by ID.
    pub async fn get_user(&self, id: &UserId) -> Result<User, AuthError> {
        self.user_repo
            .get_by_id(id)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_shape() {
        let req = RegisterRequest {
            email: "Rider@Example.com".to_string(),
            password: "hunter22".to_string(),
            name: "Rider".to_string(),
        };
        assert!(req.email.contains('@'));
        assert!(req.password.len() >= MIN_PASSWORD_LEN);
    }
}

//! User repository trait definition.
//!
//! Auth token rows are managed by the API layer directly (they are an
//! HTTP-boundary concern); this trait covers only account records.

use faredesk_types::error::RepositoryError;
use faredesk_types::user::{User, UserId};

/// Repository trait for user account persistence.
pub trait UserRepository: Send + Sync {
    /// Create a new account. `RepositoryError::Conflict` when the email
    /// is already registered.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    /// Get an account by its unique ID.
    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Get an account by email.
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;
}

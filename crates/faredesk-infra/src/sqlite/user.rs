//! SQLite user repository implementation.

use chrono::{DateTime, Utc};
use faredesk_core::repository::user::UserRepository;
use faredesk_types::error::RepositoryError;
use faredesk_types::user::{User, UserId, UserRole};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct UserRow {
    id: String,
    email: String,
    password_hash: String,
    role: String,
    name: String,
    created_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = self
            .id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;
        let role: UserRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(User {
            id,
            email: self.email,
            password_hash: self.password_hash,
            role,
            name: self.name,
            created_at,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, password_hash, role, name, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(&user.name)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("email '{}' already exists", user.email)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let user_row =
                    UserRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::password::Argon2PasswordHasher;
    use crate::sqlite::pool::DatabasePool;
    use faredesk_core::service::auth::AuthService;
    use faredesk_types::error::AuthError;
    use faredesk_types::user::{LoginRequest, RegisterRequest};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    fn service(pool: &DatabasePool) -> AuthService<SqliteUserRepository, Argon2PasswordHasher> {
        AuthService::new(
            SqliteUserRepository::new(pool.clone()),
            Argon2PasswordHasher::new(),
        )
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "hunter22".to_string(),
            name: "Rider".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let user = svc
            .register(register_request("rider@example.com"))
            .await
            .unwrap();
        assert_eq!(user.email, "rider@example.com");
        assert!(user.password_hash.starts_with("$argon2"));

        let logged_in = svc
            .login(LoginRequest {
                email: "rider@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let pool = test_pool().await;
        let svc = service(&pool);

        svc.register(register_request("rider@example.com"))
            .await
            .unwrap();

        let err = svc
            .login(LoginRequest {
                email: "rider@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let err = svc
            .login(LoginRequest {
                email: "ghost@example.com".to_string(),
                password: "hunter22".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflict() {
        let pool = test_pool().await;
        let svc = service(&pool);

        svc.register(register_request("rider@example.com"))
            .await
            .unwrap();
        let err = svc
            .register(register_request("Rider@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let pool = test_pool().await;
        let svc = service(&pool);

        let err = svc
            .register(RegisterRequest {
                email: "rider@example.com".to_string(),
                password: "12345".to_string(),
                name: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_get_by_email_normalized() {
        let pool = test_pool().await;
        let svc = service(&pool);

        svc.register(register_request("MixedCase@Example.com"))
            .await
            .unwrap();

        let repo = SqliteUserRepository::new(pool.clone());
        let found = repo.get_by_email("mixedcase@example.com").await.unwrap();
        assert!(found.is_some());
    }
}

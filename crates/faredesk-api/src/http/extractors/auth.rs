//! Bearer-token authentication extractor.
//!
//! Extracts and verifies session tokens from the
//! `Authorization: Bearer <token>` header. Tokens are SHA-256 hashed and
//! compared against the `auth_tokens` table; the plaintext is never
//! stored.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use sqlx::Row;

use faredesk_types::user::{User, UserId};

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated user behind the request. Extracting this validates
/// the bearer token.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let token_hash = hash_token(&token);

        let result = sqlx::query("SELECT user_id FROM auth_tokens WHERE token_hash = ?")
            .bind(&token_hash)
            .fetch_optional(&state.db_pool.reader)
            .await
            .map_err(|e| AppError::Internal(format!("Database error: {e}")))?;

        let Some(row) = result else {
            return Err(AppError::Auth(faredesk_types::error::AuthError::InvalidToken));
        };

        let user_id: String = row.get("user_id");
        let user_id: UserId = user_id
            .parse()
            .map_err(|e| AppError::Internal(format!("corrupt auth token row: {e}")))?;

        let user = state.auth_service.get_user(&user_id).await?;

        // Update last_used_at (best effort, don't fail the request)
        let now = chrono::Utc::now().to_rfc3339();
        let _ = sqlx::query("UPDATE auth_tokens SET last_used_at = ? WHERE token_hash = ?")
            .bind(&now)
            .bind(&token_hash)
            .execute(&state.db_pool.writer)
            .await;

        Ok(CurrentUser(user))
    }
}

/// Extract the bearer token from request headers.
fn extract_bearer_token(parts: &Parts) -> Result<String, AppError> {
    let Some(auth) = parts.headers.get("authorization") else {
        return Err(AppError::Auth(faredesk_types::error::AuthError::InvalidToken));
    };

    let auth_str = auth
        .to_str()
        .map_err(|_| AppError::Validation("Invalid Authorization header encoding".to_string()))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AppError::Auth(faredesk_types::error::AuthError::InvalidToken)),
    }
}

/// Compute SHA-256 hash of a token (lowercase hex).
pub fn hash_token(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("{:x}", digest)
}

/// Generate a session token for a user and store its hash.
///
/// Returns the plaintext token; it is shown to the client once and only
/// its hash survives.
pub async fn issue_token(state: &AppState, user_id: &UserId) -> Result<String, AppError> {
    use aes_gcm::aead::{rand_core::RngCore, OsRng};
    let mut token_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut token_bytes);
    let plaintext_token = format!(
        "fdsk_{}",
        token_bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<String>()
    );

    let token_hash = hash_token(&plaintext_token);
    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO auth_tokens (id, user_id, token_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(user_id.to_string())
    .bind(&token_hash)
    .bind(&now)
    .execute(&state.db_pool.writer)
    .await
    .map_err(|e| AppError::Internal(format!("Failed to store token: {e}")))?;

    Ok(plaintext_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_stable() {
        let a = hash_token("fdsk_abc");
        let b = hash_token("fdsk_abc");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_hash_token_differs() {
        assert_ne!(hash_token("fdsk_abc"), hash_token("fdsk_abd"));
    }
}

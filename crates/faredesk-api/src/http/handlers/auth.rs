//! Authentication handlers: register, login, current user.

use std::time::Instant;

use axum::extract::State;
use axum::Json;

use faredesk_types::user::{LoginRequest, RegisterRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::{issue_token, CurrentUser};
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/auth/register - Register a new account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let user = state.auth_service.register(body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let user_json = serde_json::to_value(&user).unwrap();
    let resp = ApiResponse::success(user_json, request_id, elapsed)
        .with_link("self", "/api/v1/auth/me");

    Ok(Json(resp))
}

/// POST /api/v1/auth/login - Verify credentials and issue a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let user = state.auth_service.login(body).await?;
    let token = issue_token(&state, &user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let payload = serde_json::json!({
        "token": token,
        "user": user,
    });
    let resp = ApiResponse::success(payload, request_id, elapsed)
        .with_link("self", "/api/v1/auth/me");

    Ok(Json(resp))
}

/// GET /api/v1/auth/me - The account behind the bearer token.
pub async fn me(
    State(_state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let elapsed = start.elapsed().as_millis() as u64;
    let user_json = serde_json::to_value(&user).unwrap();
    let resp = ApiResponse::success(user_json, request_id, elapsed);

    Ok(Json(resp))
}

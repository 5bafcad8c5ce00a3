//! Chat session and bot message handlers.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid session ID".to_string()))
}

/// Request body for starting a session.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default = "default_platform")]
    pub platform: String,
}

fn default_platform() -> String {
    "web".to_string()
}

/// POST /api/v1/chat/sessions - Start a new chat session.
pub async fn create_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session = state
        .chat_service
        .create_session(&user.id, &body.platform)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let session_json = serde_json::to_value(&session).unwrap();
    let resp = ApiResponse::success(session_json, request_id, elapsed).with_link(
        "messages",
        &format!("/api/v1/chat/sessions/{}/messages", session.id),
    );

    Ok(Json(resp))
}

/// GET /api/v1/chat/sessions - List the caller's sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let sessions = state.chat_service.list_sessions(&user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let sessions_json: Vec<serde_json::Value> = sessions
        .iter()
        .map(|s| serde_json::to_value(s).unwrap())
        .collect();

    let resp = ApiResponse::success(sessions_json, request_id, elapsed)
        .with_link("self", "/api/v1/chat/sessions");

    Ok(Json(resp))
}

/// GET /api/v1/chat/sessions/:id - Get one of the caller's sessions.
pub async fn get_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = parse_session_id(&id)?;
    let session = state.chat_service.get_session(&session_id, &user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let session_json = serde_json::to_value(&session).unwrap();
    let resp = ApiResponse::success(session_json, request_id, elapsed).with_link(
        "messages",
        &format!("/api/v1/chat/sessions/{}/messages", session.id),
    );

    Ok(Json(resp))
}

/// Request body for sending a message to the bot.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// POST /api/v1/chat/sessions/:id/messages - Send a message and get the
/// bot's reply.
pub async fn send_message(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = parse_session_id(&id)?;
    let exchange = state
        .chat_service
        .handle_message(&session_id, &user.id, &body.content)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let payload = serde_json::json!({
        "user_message": exchange.user_message,
        "assistant_message": exchange.assistant_message,
    });
    let resp = ApiResponse::success(payload, request_id, elapsed).with_link(
        "messages",
        &format!("/api/v1/chat/sessions/{session_id}/messages"),
    );

    Ok(Json(resp))
}

/// GET /api/v1/chat/sessions/:id/messages - Message history, oldest
/// first.
pub async fn get_messages(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = parse_session_id(&id)?;
    let messages = state.chat_service.get_messages(&session_id, &user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let messages_json: Vec<serde_json::Value> = messages
        .iter()
        .map(|m| serde_json::to_value(m).unwrap())
        .collect();

    let resp = ApiResponse::success(messages_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/chat/sessions/{session_id}/messages"));

    Ok(Json(resp))
}

/// POST /api/v1/chat/sessions/:id/escalate - Hand the session to a
/// human agent.
pub async fn escalate_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = parse_session_id(&id)?;
    state.chat_service.escalate(&session_id, &user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        serde_json::json!({"escalated": true}),
        request_id,
        elapsed,
    );

    Ok(Json(resp))
}

/// POST /api/v1/chat/sessions/:id/close - Close the session.
pub async fn close_session(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = parse_session_id(&id)?;
    state.chat_service.close(&session_id, &user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(serde_json::json!({"closed": true}), request_id, elapsed);

    Ok(Json(resp))
}

//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use faredesk_types::error::{AuthError, ChatError, TicketError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Ticket lifecycle errors.
    Ticket(TicketError),
    /// Authentication errors.
    Auth(AuthError),
    /// Chat errors.
    Chat(ChatError),
    /// Validation error raised at the HTTP boundary.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<TicketError> for AppError {
    fn from(e: TicketError) -> Self {
        AppError::Ticket(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        AppError::Auth(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Ticket(TicketError::NotFound(what)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Not found: {what}"),
            ),
            AppError::Ticket(TicketError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Ticket(e @ TicketError::InvalidState { .. }) => {
                (StatusCode::CONFLICT, "INVALID_STATE", e.to_string())
            }
            AppError::Ticket(e @ TicketError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::Auth(AuthError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid credentials".to_string(),
            ),
            AppError::Auth(AuthError::InvalidToken) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or expired token".to_string(),
            ),
            AppError::Auth(e @ AuthError::EmailTaken(_)) => {
                (StatusCode::CONFLICT, "EMAIL_TAKEN", e.to_string())
            }
            AppError::Auth(AuthError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Auth(e @ AuthError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::Chat(ChatError::SessionNotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Chat session not found".to_string(),
            ),
            AppError::Chat(ChatError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(e @ ChatError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

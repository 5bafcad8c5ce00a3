//! Cancellation and refund handlers, keyed by the external ticket number.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use faredesk_types::refund::RefundStatus;

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for cancelling a ticket.
#[derive(Debug, Deserialize)]
pub struct CancelTicketRequest {
    pub reason: String,
}

/// POST /api/v1/tickets/:number/cancel - Cancel a sold ticket and open
/// its refund request.
pub async fn cancel_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(number): Path<String>,
    Json(body): Json<CancelTicketRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    if body.reason.trim().is_empty() {
        return Err(AppError::Validation("Reason is required".to_string()));
    }

    let ticket = state
        .ticket_service
        .cancel_by_number(&number, body.reason.trim(), &user.id.to_string())
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let ticket_json = serde_json::to_value(&ticket).unwrap();
    let resp = ApiResponse::success(ticket_json, request_id, elapsed)
        .with_link("refund", &format!("/api/v1/tickets/{number}/refund-status"));

    Ok(Json(resp))
}

/// GET /api/v1/tickets/:number/refund-status - The operative refund
/// request for a ticket.
pub async fn get_refund_status(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(number): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let refund = state.ticket_service.refund_status_by_number(&number).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let refund_json = serde_json::to_value(&refund).unwrap();
    let resp = ApiResponse::success(refund_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/tickets/{number}/refund-status"));

    Ok(Json(resp))
}

/// Request body for resolving a refund.
#[derive(Debug, Deserialize)]
pub struct UpdateRefundStatusRequest {
    pub status: String,
    pub processed_by: String,
}

/// PUT /api/v1/tickets/:number/refund-status - Resolve the latest refund
/// request for a ticket.
pub async fn update_refund_status(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(number): Path<String>,
    Json(body): Json<UpdateRefundStatusRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let status: RefundStatus = body
        .status
        .parse()
        .map_err(|e: String| AppError::Validation(e))?;

    if body.processed_by.trim().is_empty() {
        return Err(AppError::Validation("processed_by is required".to_string()));
    }

    let refund = state
        .ticket_service
        .update_refund_status_by_number(&number, status, body.processed_by.trim())
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let refund_json = serde_json::to_value(&refund).unwrap();
    let resp = ApiResponse::success(refund_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/tickets/{number}/refund-status"));

    Ok(Json(resp))
}

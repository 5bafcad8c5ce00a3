//! Support ticket handlers: create, list, get, status updates, history.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use faredesk_types::ticket::{CreateTicketRequest, TicketId, TicketStatus};

use crate::http::error::AppError;
use crate::http::extractors::auth::CurrentUser;
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn parse_ticket_id(raw: &str) -> Result<TicketId, AppError> {
    raw.parse()
        .map_err(|_| AppError::Validation("Invalid ticket ID".to_string()))
}

/// POST /api/v1/tickets - Create a new support ticket.
pub async fn create_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateTicketRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let ticket = state.ticket_service.create_ticket(&user.id, body).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let ticket_json = serde_json::to_value(&ticket).unwrap();
    let mut resp = ApiResponse::success(ticket_json, request_id, elapsed);
    resp.links
        .insert("self".to_string(), format!("/api/v1/tickets/{}", ticket.id));
    resp.links.insert(
        "history".to_string(),
        format!("/api/v1/tickets/{}/history", ticket.id),
    );

    Ok(Json(resp))
}

/// GET /api/v1/tickets - List the caller's tickets.
pub async fn list_tickets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let tickets = state.ticket_service.list_tickets(&user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let tickets_json: Vec<serde_json::Value> = tickets
        .iter()
        .map(|t| serde_json::to_value(t).unwrap())
        .collect();

    let resp = ApiResponse::success(tickets_json, request_id, elapsed)
        .with_link("self", "/api/v1/tickets");

    Ok(Json(resp))
}

/// GET /api/v1/tickets/:id - Get one of the caller's tickets.
pub async fn get_ticket(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let ticket_id = parse_ticket_id(&id)?;
    let ticket = state.ticket_service.get_ticket(&ticket_id, &user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let ticket_json = serde_json::to_value(&ticket).unwrap();
    let resp = ApiResponse::success(ticket_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/tickets/{}", ticket.id))
        .with_link("history", &format!("/api/v1/tickets/{}/history", ticket.id));

    Ok(Json(resp))
}

/// Request body for a status update.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub description: String,
}

/// PUT /api/v1/tickets/:id/status - Update a ticket's status.
pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let ticket_id = parse_ticket_id(&id)?;
    let status: TicketStatus = body
        .status
        .parse()
        .map_err(|e: String| AppError::Validation(e))?;

    let ticket = state
        .ticket_service
        .update_status(&ticket_id, &user.id, status, &body.description)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let ticket_json = serde_json::to_value(&ticket).unwrap();
    let resp = ApiResponse::success(ticket_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/tickets/{}", ticket.id));

    Ok(Json(resp))
}

/// GET /api/v1/tickets/:id/history - The ticket's audit trail.
pub async fn get_history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<serde_json::Value>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let ticket_id = parse_ticket_id(&id)?;
    let history = state.ticket_service.get_history(&ticket_id, &user.id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let history_json: Vec<serde_json::Value> = history
        .iter()
        .map(|entry| serde_json::to_value(entry).unwrap())
        .collect();

    let resp = ApiResponse::success(history_json, request_id, elapsed)
        .with_link("self", &format!("/api/v1/tickets/{id}/history"));

    Ok(Json(resp))
}

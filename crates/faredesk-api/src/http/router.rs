//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Middleware: CORS, tracing.
//! `/auth/register`, `/auth/login`, and `/health` are the only
//! unauthenticated routes; everything else extracts the bearer token.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Auth
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        // Support tickets
        .route("/tickets", post(handlers::ticket::create_ticket))
        .route("/tickets", get(handlers::ticket::list_tickets))
        .route("/tickets/{id}", get(handlers::ticket::get_ticket))
        .route("/tickets/{id}/status", put(handlers::ticket::update_status))
        .route("/tickets/{id}/history", get(handlers::ticket::get_history))
        // Cancellation and refunds. These take the external ticket
        // number in the path; the segment is named {id} because matchit
        // requires one parameter name per position.
        .route(
            "/tickets/{id}/cancel",
            post(handlers::refund::cancel_ticket),
        )
        .route(
            "/tickets/{id}/refund-status",
            get(handlers::refund::get_refund_status).put(handlers::refund::update_refund_status),
        )
        // Chat sessions
        .route("/chat/sessions", post(handlers::chat::create_session))
        .route("/chat/sessions", get(handlers::chat::list_sessions))
        .route("/chat/sessions/{id}", get(handlers::chat::get_session))
        .route(
            "/chat/sessions/{id}/messages",
            post(handlers::chat::send_message).get(handlers::chat::get_messages),
        )
        .route(
            "/chat/sessions/{id}/escalate",
            post(handlers::chat::escalate_session),
        )
        .route(
            "/chat/sessions/{id}/close",
            post(handlers::chat::close_session),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Snapshot and violation queries
//! - WebSocket event delivery

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::face_client::IdentityResolver;
use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let face_service_ok = state.resolver.health_check().await.unwrap_or(false);

    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        face_service_connected: face_service_ok,
        monitor_running: state.monitor.is_running().await,
        roster_size: state.roster.len(),
    };

    Json(response)
}

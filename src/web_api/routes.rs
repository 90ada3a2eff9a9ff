//! API Routes

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use serde_json::json;

use crate::models::ApiResponse;
use crate::state::AppState;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(super::health_check))
        // Monitor state queries
        .route("/api/stats", get(get_stats))
        .route("/api/violations", get(get_violations))
        // Session reset (ledger + absence alarm)
        .route("/api/reset", post(reset_session))
        // WebSocket
        .route("/api/ws", get(websocket_handler))
        .with_state(state)
}

// ========================================
// Monitor State Handlers
// ========================================

/// Full current snapshot; the empty default before the pipeline starts
async fn get_stats(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.status.current().await;
    Json(snapshot.as_ref().clone())
}

/// Just the active violation map from the current snapshot
async fn get_violations(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.status.current().await;
    Json(snapshot.violations.clone())
}

/// Clear the violation ledger and re-arm the absence alarm.
///
/// Called between class periods (or by an operator) to start a fresh
/// accounting session without restarting the pipeline.
async fn reset_session(State(state): State<AppState>) -> impl IntoResponse {
    state.tracker.reset().await;
    state.presence.reset().await;
    tracing::info!("Session state reset via API");
    Json(ApiResponse::success(json!({ "reset": true })))
}

// ========================================
// WebSocket Handler
// ========================================

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Register with RealtimeHub
    let (conn_id, mut rx) = state.realtime.register().await;

    tracing::info!(connection_id = %conn_id, "WebSocket client connected");

    // Forward hub messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Drain incoming messages until close
    let recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Ping(data)) => {
                    // Pong is handled automatically by axum
                    tracing::trace!("Received ping: {:?}", data);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %conn_id, "WebSocket client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::warn!(connection_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // Whichever side finishes first tears the connection down
    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    state.realtime.unregister(&conn_id).await;
}

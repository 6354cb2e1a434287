//! Health Routes
//!
//! - GET /health - Liveness plus basic counters

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.uptime_seconds(),
        chat_connections: state.chat_connection_count().await,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

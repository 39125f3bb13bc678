//! Admin endpoints

use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

/// Health check endpoint
///
/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<JsonValue> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
    }))
}

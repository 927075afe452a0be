//! Health check endpoints.
//!
//! - `/livez` - Liveness probe (immediate 200, no checks)
//! - `/healthz` - Names the active storage and image backends

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Backend summary.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "storage": state.storage_backend,
        "images": state.uploader.backend(),
    }))
}

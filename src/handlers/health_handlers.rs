//! Liveness handler.
//!
//! - GET /healthz -> configured bucket and region, never fails

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /healthz`
///
/// Liveness check: reports configuration only and performs no I/O
/// against the backend.
pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            bucket: state.config.bucket.clone(),
            region: state.config.region.clone(),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    bucket: Option<String>,
    region: String,
}

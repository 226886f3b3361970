//! Defines the gateway's HTTP surface.
//!
//! ## Structure
//! - `GET  /healthz`  — liveness, reports bucket and region
//! - `GET  /list`     — list objects under the prefix (`?limit=`, max 200)
//! - `GET  /files`    — alias of `/list`
//! - `POST /upload`   — multipart upload (`file`, optional `key`)
//! - `GET  /download` — stream an object (`?key=`)

use crate::{
    handlers::{
        health_handlers::healthz,
        object_handlers::{download_file, list_files, upload_file},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Room for multipart boundaries, part headers and the `key` field on top of
/// the file itself.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the router for all gateway routes.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/list", get(list_files))
        .route("/files", get(list_files))
        .route("/upload", post(upload_file))
        .route("/download", get(download_file))
}

/// The complete application: routes, request body cap, CORS and tracing,
/// bound to `state`.
pub fn app(state: AppState) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

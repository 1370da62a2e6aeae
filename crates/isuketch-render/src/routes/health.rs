//! Liveness probe for the render server.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    /// Render cache backend in use, "redis" or "memory".
    render_cache: &'static str,
}

/// `GET /health`. Answers from local state only: neither the backend API
/// nor Redis is contacted, so a probe never fails because of them.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        render_cache: state.cache.backend_name(),
    })
}

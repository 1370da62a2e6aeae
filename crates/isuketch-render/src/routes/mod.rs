//! Route definitions for the render service.
//!
//! ## Routes
//!
//! - `GET /health` - Health check (JSON)
//! - `GET /img/{id}` - Room snapshot (SVG)
//! - `ANY /api/{*path}` - Forwarded to the backend
//! - static files from the public directory
//! - `GET *` - Server-rendered page for any other URL (other methods: 405)

pub mod gateway;
mod health;
mod img;
mod page;

use axum::Router;
use axum::routing::{MethodRouter, any, get};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Build the complete render service router.
pub fn router(state: AppState) -> Router {
    // Static assets first; anything not on disk is a page request. Pages
    // answer GET and HEAD only, other methods get 405.
    let pages: MethodRouter = get(page::page_handler).with_state(state.clone());
    let assets = ServeDir::new(&state.config.public_dir)
        .append_index_html_on_directories(false)
        .call_fallback_on_method_not_allowed(true)
        .fallback(pages);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/img/{id}", get(img::snapshot_handler))
        .route("/api/{*path}", any(gateway::forward))
        .fallback_service(assets)
        .with_state(state)
}

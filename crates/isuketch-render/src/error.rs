//! Error types for the render service.
//!
//! Errors are rendered as simple HTML error pages rather than JSON,
//! since this is a user-facing HTML service. Every failure is logged with
//! its cause when it is converted into a response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::{DOCTYPE, html};

use crate::api::BackendError;
use crate::cache::CacheError;

/// Render service error type.
#[derive(Debug, thiserror::Error)]
pub enum SketchError {
    /// No route matched the requested URL.
    #[error("no route matches {0}")]
    RouteNotMatched(String),

    /// The backend has no room with this id.
    #[error("room {0} not found")]
    RoomNotFound(u64),

    /// The CSRF token could not be obtained from the backend.
    #[error("csrf token fetch failed: {0}")]
    TokenFetch(#[source] BackendError),

    /// A data requirement of the matched view could not be fetched.
    #[error("data load failed for '{key}': {source}")]
    DataLoad {
        /// Requirement key that failed.
        key: String,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },

    /// The render cache could not be read.
    #[error("render cache read failed: {0}")]
    CacheRead(#[from] CacheError),

    /// Fetching room data for a snapshot failed.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[source] BackendError),

    /// Writing or reading back a snapshot artifact failed.
    #[error("snapshot persist failed for {path}: {source}")]
    Persist {
        /// Artifact path.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The markup renderer rejected the data it was given.
    #[error("render failed: {0}")]
    Render(String),

    /// The API gateway could not reach the backend.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SketchError {
    /// HTTP status this error maps to at the boundary.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RouteNotMatched(_) | Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SketchError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = match &self {
            Self::RouteNotMatched(_) => ("Not Found", "The requested page does not exist."),
            Self::RoomNotFound(_) => ("Not Found", "This room does not exist."),
            Self::Gateway(_) => {
                tracing::error!(error = %self, "gateway error");
                ("Bad Gateway", "The backend is temporarily unavailable.")
            }
            _ => {
                tracing::error!(error = %self, "internal server error");
                (
                    "Internal Server Error",
                    "An internal error occurred. Please try again later.",
                )
            }
        };

        if status == StatusCode::NOT_FOUND {
            tracing::debug!(error = %self, "not found");
        }

        let markup = html! {
            (DOCTYPE)
            html lang="ja" {
                head {
                    meta charset="utf-8";
                    meta name="viewport" content="width=device-width,initial-scale=1";
                    title { (title) " - ISUketch" }
                    style { (maud::PreEscaped(crate::render::components::ERROR_CSS)) }
                }
                body {
                    main class="error-page" {
                        h1 { (title) }
                        p { (message) }
                        a href="/" { "Back to ISUketch" }
                    }
                }
            }
        };

        (status, markup).into_response()
    }
}

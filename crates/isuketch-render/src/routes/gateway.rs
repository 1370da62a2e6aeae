//! API gateway: forwards `/api/*` requests to the backend unchanged.
//!
//! The client bundle talks to the backend through this service, so it sees
//! a single origin. Request and response bodies are passed through as-is;
//! responses are streamed, which keeps server-sent event streams working.

use std::time::Duration;

use anyhow::Context;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, header};
use axum::response::Response;

use crate::error::SketchError;
use crate::state::AppState;

/// Largest request body forwarded to the backend.
const MAX_REQUEST_BODY: usize = 10 * 1024 * 1024;

/// Build the gateway HTTP client.
///
/// Only connecting is bounded by `connect_timeout`; a response may stay
/// open as long as the backend keeps it open.
pub fn client(connect_timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("failed to build gateway HTTP client")
}

/// Forward a request to the backend and stream its response back.
pub async fn forward(
    State(state): State<AppState>,
    req: Request,
) -> Result<Response, SketchError> {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let target = state.api.url_for(&path_and_query);

    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, MAX_REQUEST_BODY)
        .await
        .map_err(|e| SketchError::Gateway(format!("failed to read request body: {e}")))?;

    tracing::debug!(method = %parts.method, target = %target, "forwarding to backend");

    let upstream = state
        .gateway
        .request(parts.method, &target)
        .headers(forwardable(&parts.headers, true))
        .body(body)
        .send()
        .await
        .map_err(|e| SketchError::Gateway(format!("{target}: {e}")))?;

    let mut response = Response::builder().status(upstream.status());
    if let Some(headers) = response.headers_mut() {
        headers.extend(forwardable(upstream.headers(), false));
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| SketchError::Internal(e.into()))
}

/// Copy `headers` without hop-by-hop headers. Request headers also lose
/// `Host` and `Content-Length`, which the client sets for the new request.
fn forwardable(headers: &HeaderMap, is_request: bool) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_hop_by_hop(name) {
            continue;
        }
        if is_request && (name == header::HOST || name == header::CONTENT_LENGTH) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Headers that describe a single connection and must not be forwarded.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    [
        header::CONNECTION,
        header::PROXY_AUTHENTICATE,
        header::PROXY_AUTHORIZATION,
        header::TE,
        header::TRAILER,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ]
    .contains(name)
}

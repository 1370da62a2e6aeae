//! Server-rendered page handler.
//!
//! Flow for every page request:
//!
//! 1. Resolve the URL against the route table (404 or redirect end here)
//! 2. Fetch a fresh CSRF token from the backend
//! 3. Look the URL up in the render cache
//! 4. On a miss, load the view's data, render it and store the result
//! 5. Assemble the document around the markup, hydration and token
//!
//! The token is never cached; it is injected at assembly time, so a cached
//! page is always served with the token fetched for this request.

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};

use crate::cache::CachedPage;
use crate::document;
use crate::error::SketchError;
use crate::loader::{self, LoadContext};
use crate::resolve::Resolution;
use crate::state::AppState;

/// Handle a page request for any URL not served by another route.
pub async fn page_handler(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, SketchError> {
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let matched = match state.routes.resolve(url) {
        Resolution::Matched(matched) => matched,
        Resolution::Redirect(location) => {
            tracing::debug!(from = url, to = %location, "redirecting");
            return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
        }
        Resolution::NotFound => return Err(SketchError::RouteNotMatched(url.to_string())),
    };

    let ctx = LoadContext::fetch(&state.api).await?;

    let page = match state.cache.get(url).await? {
        Some(page) => {
            tracing::debug!(url, "render cache hit");
            page
        }
        None => {
            tracing::debug!(url, view = ?matched.view, "render cache miss");
            let loaded = loader::load(&matched, &ctx).await?;
            let markup = state.renderer.render_view(matched.view, &loaded.data)?;
            let page = CachedPage::new(markup, loaded.hydration);

            if let Err(e) = state.cache.set(url, page.clone()).await {
                tracing::warn!(url, error = %e, "failed to store rendered page");
            }
            page
        }
    };

    let html = document::assemble(&page.markup, &page.hydration, &ctx.csrf_token).into_string();
    Ok(build_response(html))
}

/// Build the HTML response with its headers.
fn build_response(html: String) -> Response {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    // Every response carries a fresh CSRF token, so nothing downstream may
    // store it.
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    let hash = xxhash_rust::xxh3::xxh3_64(html.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    (StatusCode::OK, headers, html).into_response()
}

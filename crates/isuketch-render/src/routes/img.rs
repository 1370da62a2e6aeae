//! Room snapshot handler.

use axum::extract::{Path, State};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};

use crate::error::SketchError;
use crate::snapshot::{self, SVG_CONTENT_TYPE};
use crate::state::AppState;

/// Serve a freshly rendered snapshot of a room's canvas.
///
/// `GET /img/{id}` and `GET /img/{id}.svg` are equivalent. The body is the
/// file that was just persisted to the snapshot directory.
pub async fn snapshot_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, SketchError> {
    let id = parse_room_id(&raw)
        .ok_or_else(|| SketchError::RouteNotMatched(format!("/img/{raw}")))?;

    let body =
        snapshot::render_snapshot(&state.api, state.renderer.as_ref(), &state.snapshots, id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(SVG_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        ],
        body,
    )
        .into_response())
}

/// Parse a room id, with or without a trailing `.svg`.
fn parse_room_id(raw: &str) -> Option<u64> {
    let digits = raw.strip_suffix(".svg").unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_suffixed_ids() {
        assert_eq!(parse_room_id("42"), Some(42));
        assert_eq!(parse_room_id("42.svg"), Some(42));
        assert_eq!(parse_room_id("0"), Some(0));
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert_eq!(parse_room_id(""), None);
        assert_eq!(parse_room_id(".svg"), None);
        assert_eq!(parse_room_id("abc"), None);
        assert_eq!(parse_room_id("-1"), None);
        assert_eq!(parse_room_id("+1"), None);
        assert_eq!(parse_room_id("1.png"), None);
        assert_eq!(parse_room_id("99999999999999999999999"), None);
    }
}

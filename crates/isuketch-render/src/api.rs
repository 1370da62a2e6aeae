//! Backend API client for rooms, strokes and CSRF tokens.
//!
//! All calls share one `reqwest::Client` with a client-wide timeout, so a
//! stalled backend fails the request instead of hanging it.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Header carrying the CSRF token on backend calls.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Error message the backend returns, with status 500, for an unknown room.
pub const ROOM_MISSING_MESSAGE: &str = "この部屋は存在しません。";

/// A drawing room as returned by `GET /api/rooms/:id`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Room {
    /// Room ID.
    pub id: u64,
    /// Room name.
    #[serde(default)]
    pub name: String,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// RFC 3339 creation time.
    #[serde(default)]
    pub created_at: String,
    /// Strokes in drawing order. Empty in room listings.
    #[serde(default)]
    pub strokes: Vec<Stroke>,
    /// Number of strokes (listings only).
    #[serde(default)]
    pub stroke_count: u64,
    /// Number of clients currently watching the room.
    #[serde(default)]
    pub watcher_count: u64,
}

/// A single pen stroke.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Stroke {
    /// Stroke ID.
    pub id: u64,
    /// Owning room.
    #[serde(default)]
    pub room_id: u64,
    /// Pen width.
    pub width: u32,
    /// Color channels.
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Opacity in `0.0..=1.0`.
    pub alpha: f64,
    /// Points in drawing order.
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub created_at: String,
}

/// A point on a stroke.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Point {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub stroke_id: u64,
    pub x: f64,
    pub y: f64,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Deserialize)]
struct RoomResponse {
    room: Room,
}

/// Failure talking to the backend API.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The request could not be sent or the response not received
    /// (connection refused, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend reported that the resource does not exist.
    #[error("{url} not found")]
    NotFound { url: String },

    /// The backend answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// The response body was not the expected JSON.
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Client for the backend API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url)
            .map_err(|e| anyhow::anyhow!("invalid backend address '{base_url}': {e}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("backend address '{base_url}' cannot be used as a base URL");
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base,
            base_url,
        })
    }

    /// Backend base address.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a raw backend path and query (which must start with `/`).
    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Absolute URL built from path segments. Each segment is
    /// percent-encoded, so a segment can never introduce `/`, `?` or `..`.
    pub fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }

    /// Issue a fresh CSRF token (`POST /api/csrf_token`).
    pub async fn fetch_csrf_token(&self) -> Result<String, BackendError> {
        let url = self.url_for("/api/csrf_token");
        let response = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;

        let body: TokenResponse = read_json(&url, response).await?;
        Ok(body.token)
    }

    /// `GET` a backend path and return its JSON body.
    pub async fn get_json(
        &self,
        url: Url,
        csrf_token: Option<&str>,
    ) -> Result<serde_json::Value, BackendError> {
        let url = url.to_string();
        let mut request = self.http.get(&url);
        if let Some(token) = csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;

        read_json(&url, response).await
    }

    /// Fetch a room with all of its strokes (`GET /api/rooms/:id`).
    pub async fn fetch_room(&self, id: u64) -> Result<Room, BackendError> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "rooms", id.as_str()]).to_string();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| BackendError::Request {
                url: url.clone(),
                source,
            })?;

        let body: RoomResponse = read_json(&url, response).await?;
        Ok(body.room)
    }
}

/// Check the status and decode a JSON body.
async fn read_json<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| BackendError::Request {
            url: url.to_string(),
            source,
        })?;

    if !status.is_success() {
        return Err(failure(url, status, &bytes));
    }

    serde_json::from_slice(&bytes).map_err(|source| BackendError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Classify a non-success response.
///
/// The backend reports an unknown room id as a 500 carrying
/// [`ROOM_MISSING_MESSAGE`]; that and a plain 404 are both `NotFound`.
fn failure(url: &str, status: StatusCode, body: &[u8]) -> BackendError {
    let missing = status == StatusCode::NOT_FOUND
        || serde_json::from_slice::<ErrorResponse>(body)
            .is_ok_and(|body| body.error == ROOM_MISSING_MESSAGE);

    if missing {
        BackendError::NotFound {
            url: url.to_string(),
        }
    } else {
        BackendError::Status {
            url: url.to_string(),
            status,
        }
    }
}

//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Default listen port when `PORT` is unset.
const DEFAULT_PORT: u16 = 443;

/// Redis shared with the backend API when `REDIS_URL` is unset.
const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:443").
    pub bind_addr: String,

    /// Backend API base address, without a trailing slash.
    /// e.g., "http://localhost:8000"
    pub api_base_url: String,

    /// Redis URL for the render cache. `None` selects the in-process cache.
    ///
    /// The backend API deletes `/` and `/rooms/<id>` from this Redis when
    /// rooms or strokes change; the in-process cache never sees those
    /// deletions and only expires entries by TTL.
    pub redis_url: Option<String>,

    /// Time-to-live for rendered pages in the render cache.
    pub render_cache_ttl: Duration,

    /// Maximum number of entries held by the in-process render cache.
    pub render_cache_capacity: u64,

    /// Upper bound on every backend fetch and every cache operation.
    pub backend_timeout: Duration,

    /// Directory where room snapshots (`<id>.svg`) are written.
    pub snapshot_dir: PathBuf,

    /// Directory of static assets served ahead of the page catch-all.
    pub public_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `API`: Backend base address (e.g. "http://localhost:8000")
    ///
    /// Optional:
    /// - `PORT`: Listen port (default: 443)
    /// - `BIND_ADDR`: Full bind address, overrides `PORT`
    /// - `RENDER_CACHE`: "redis" (default) or "memory" (in-process, opt-in)
    /// - `REDIS_URL`: Redis render cache (default: "redis://localhost:6379")
    /// - `RENDER_CACHE_TTL_SECS`: Render cache TTL (default: 300)
    /// - `RENDER_CACHE_CAPACITY`: In-process cache capacity (default: 10000)
    /// - `BACKEND_TIMEOUT_SECS`: Backend and cache timeout (default: 10)
    /// - `SNAPSHOT_DIR`: Snapshot output directory (default: "img")
    /// - `PUBLIC_DIR`: Static asset directory (default: "public")
    pub fn from_env() -> anyhow::Result<Self> {
        let api_base_url = std::env::var("API")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!("API environment variable is required (e.g. API=http://...)")
            })?;

        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(addr) if !addr.trim().is_empty() => addr.trim().to_string(),
            _ => {
                let port = parse_var("PORT", DEFAULT_PORT)?;
                format!("0.0.0.0:{port}")
            }
        };

        let render_cache = std::env::var("RENDER_CACHE").unwrap_or_default();
        let redis_url = match render_cache.trim() {
            "" | "redis" => Some(
                std::env::var("REDIS_URL")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string()),
            ),
            "memory" => None,
            other => anyhow::bail!("invalid RENDER_CACHE value '{other}': expected redis or memory"),
        };

        let render_cache_ttl = Duration::from_secs(parse_var("RENDER_CACHE_TTL_SECS", 300)?);
        let render_cache_capacity = parse_var("RENDER_CACHE_CAPACITY", 10_000)?;
        let backend_timeout = Duration::from_secs(parse_var("BACKEND_TIMEOUT_SECS", 10)?);

        let snapshot_dir =
            PathBuf::from(std::env::var("SNAPSHOT_DIR").unwrap_or_else(|_| "img".to_string()));
        let public_dir =
            PathBuf::from(std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()));

        tracing::info!(
            bind_addr = %bind_addr,
            api_base_url = %api_base_url,
            cache_backend = if redis_url.is_some() { "redis" } else { "memory" },
            cache_ttl_secs = render_cache_ttl.as_secs(),
            backend_timeout_secs = backend_timeout.as_secs(),
            snapshot_dir = %snapshot_dir.display(),
            "render configuration loaded"
        );

        Ok(Self {
            bind_addr,
            api_base_url,
            redis_url,
            render_cache_ttl,
            render_cache_capacity,
            backend_timeout,
            snapshot_dir,
            public_dir,
        })
    }

    /// Configuration pointing at `api_base_url` with the in-process cache and
    /// defaults for everything else. Used by tests and embedders that don't
    /// read the environment.
    pub fn for_backend(api_base_url: impl Into<String>) -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            redis_url: None,
            render_cache_ttl: Duration::from_secs(300),
            render_cache_capacity: 10_000,
            backend_timeout: Duration::from_secs(10),
            snapshot_dir: PathBuf::from("img"),
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} value '{raw}': {e}")),
        _ => Ok(default),
    }
}

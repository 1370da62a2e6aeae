//! Render cache for page markup, keyed by request URL.
//!
//! Cache-aside: the page handler reads before rendering and writes the
//! rendered result back on a miss. Two backends are supported:
//!
//! | Backend | Selected by | Eviction |
//! |---------|-------------|----------|
//! | Redis | default (`REDIS_URL`) | TTL (`SETEX`), or deletion by the backend API |
//! | In-process (moka) | `RENDER_CACHE=memory` | capacity bound + TTL |
//!
//! ## Concurrency
//!
//! There is no per-key locking. Two concurrent misses for the same URL both
//! render and both write; the last write wins. Entries are written whole,
//! so a reader sees either the old entry or a new one, never a mix.
//!
//! ## Failure policy
//!
//! Read failures are returned to the caller (the request fails). Write
//! failures are returned too, and the page handler logs and ignores them.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// A rendered page as stored in the cache.
///
/// Holds the application markup and the hydration fragment produced from
/// the same data load. The CSRF token is never part of a cached page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedPage {
    /// Rendered application markup (the contents of `#app`).
    pub markup: String,
    /// Hydration `<script>` fragment for the same data.
    pub hydration: String,
    /// When this entry was rendered.
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

impl CachedPage {
    /// A freshly rendered page.
    pub fn new(markup: String, hydration: String) -> Self {
        Self {
            markup,
            hydration,
            cached_at: chrono::Utc::now(),
        }
    }
}

/// Render cache backend failure.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Redis connection or command error.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The operation did not finish within the configured timeout.
    #[error("cache operation timed out")]
    Timeout,

    /// The entry could not be encoded for storage.
    #[error("cache entry encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Render cache with a pluggable backend.
#[derive(Clone)]
pub enum RenderCache {
    /// In-process cache.
    Memory(Cache<String, CachedPage>),
    /// Shared Redis cache.
    Redis(RedisRenderCache),
}

impl RenderCache {
    /// In-process cache holding at most `capacity` pages for `ttl` each.
    pub fn memory(capacity: u64, ttl: Duration) -> Self {
        Self::Memory(
            Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        )
    }

    /// Redis-backed cache. The connection is opened on first use.
    pub fn redis(url: &str, ttl: Duration, timeout: Duration) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| anyhow::anyhow!("invalid REDIS_URL '{url}': {e}"))?;

        Ok(Self::Redis(RedisRenderCache {
            client,
            connection: Arc::new(OnceCell::new()),
            ttl,
            timeout,
        }))
    }

    /// Name of the active backend, for logging.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Redis(_) => "redis",
        }
    }

    /// Look up the page rendered for `key`.
    pub async fn get(&self, key: &str) -> Result<Option<CachedPage>, CacheError> {
        match self {
            Self::Memory(cache) => Ok(cache.get(key).await),
            Self::Redis(redis) => redis.get(key).await,
        }
    }

    /// Store the page rendered for `key`, replacing any previous entry.
    pub async fn set(&self, key: &str, page: CachedPage) -> Result<(), CacheError> {
        match self {
            Self::Memory(cache) => {
                cache.insert(key.to_string(), page).await;
                Ok(())
            }
            Self::Redis(redis) => redis.set(key, &page).await,
        }
    }
}

/// Redis render cache backend. Entries are JSON-encoded [`CachedPage`]s
/// stored under the raw request URL, so the backend API can invalidate a
/// page by deleting its URL.
///
/// The connection is a [`ConnectionManager`]: a command that fails on a
/// dropped connection returns its error, and the manager reconnects for
/// the commands after it.
#[derive(Clone)]
pub struct RedisRenderCache {
    client: redis::Client,
    connection: Arc<OnceCell<ConnectionManager>>,
    ttl: Duration,
    timeout: Duration,
}

impl RedisRenderCache {
    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                tracing::debug!("opening redis connection");
                ConnectionManager::new(self.client.clone()).await
            })
            .await?;
        Ok(conn.clone())
    }

    async fn get(&self, key: &str) -> Result<Option<CachedPage>, CacheError> {
        let raw: Option<String> = tokio::time::timeout(self.timeout, async {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn.get(key).await?;
            Ok::<_, CacheError>(value)
        })
        .await
        .map_err(|_| CacheError::Timeout)??;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(page) => Ok(Some(page)),
            Err(e) => {
                // Corrupted entry - treat as a miss so it gets overwritten
                tracing::warn!(key = %key, error = %e, "failed to decode cached page");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, page: &CachedPage) -> Result<(), CacheError> {
        let json = serde_json::to_string(page)?;
        let ttl_secs = self.ttl.as_secs().max(1);

        tokio::time::timeout(self.timeout, async {
            let mut conn = self.connection().await?;
            let _: () = conn.set_ex(key, json, ttl_secs).await?;
            Ok::<_, CacheError>(())
        })
        .await
        .map_err(|_| CacheError::Timeout)?
    }
}

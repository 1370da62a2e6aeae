//! Application state shared across all request handlers.
//!
//! Everything here is created once at startup and shared read-only by all
//! requests. Only the cache keeps mutable state (its entries and, for
//! Redis, its connection).

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cache::RenderCache;
use crate::config::Config;
use crate::render::{MarkupRenderer, SketchRenderer};
use crate::resolve::RouteTable;
use crate::snapshot::SnapshotStore;

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,

    /// Backend API client.
    pub api: ApiClient,

    /// HTTP client for the API gateway (no overall timeout, so streamed
    /// responses can stay open).
    pub gateway: reqwest::Client,

    /// Client route table.
    pub routes: Arc<RouteTable>,

    /// Rendered page cache keyed by request URL.
    pub cache: RenderCache,

    /// Markup renderer for views and snapshots.
    pub renderer: Arc<dyn MarkupRenderer>,

    /// Snapshot file storage.
    pub snapshots: SnapshotStore,
}

impl AppState {
    /// Create a new application state from configuration.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let cache = match &config.redis_url {
            Some(url) => RenderCache::redis(url, config.render_cache_ttl, config.backend_timeout)?,
            None => {
                tracing::warn!(
                    ttl_secs = config.render_cache_ttl.as_secs(),
                    "in-process render cache: backend invalidations are not seen, pages refresh on TTL only"
                );
                RenderCache::memory(config.render_cache_capacity, config.render_cache_ttl)
            }
        };

        Self::with_parts(config, cache, Arc::new(SketchRenderer))
    }

    /// Create state with an explicit cache and renderer.
    pub fn with_parts(
        config: Config,
        cache: RenderCache,
        renderer: Arc<dyn MarkupRenderer>,
    ) -> anyhow::Result<Self> {
        let api = ApiClient::new(&config.api_base_url, config.backend_timeout)?;
        let gateway = crate::routes::gateway::client(config.backend_timeout)?;
        let snapshots = SnapshotStore::new(config.snapshot_dir.clone());

        tracing::info!(
            cache_backend = cache.backend_name(),
            cache_ttl_secs = config.render_cache_ttl.as_secs(),
            snapshot_dir = %snapshots.dir().display(),
            "application state initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            api,
            gateway,
            routes: Arc::new(RouteTable::default()),
            cache,
            renderer,
            snapshots,
        })
    }
}

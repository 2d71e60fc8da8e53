//! Explicit series cache
//!
//! Entries are keyed by provider name and request, expire after a fixed
//! time-to-live and are bounded in number. Cache state belongs to the value,
//! never to a global. Only worth wrapping a provider in when one `Monitor`
//! (or provider) is reused across runs; a one-shot run fetches each series
//! once.

use super::{SeriesProvider, SeriesRequest};
use crate::config::DataConfig;
use crate::series::Series;
use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

type CacheKey = (String, SeriesRequest);

/// Entries kept when no capacity is configured
pub const DEFAULT_CACHE_CAPACITY: u64 = 1_024;

/// Wraps a provider with a bounded time-to-live cache
pub struct CachedProvider<P> {
    inner: P,
    entries: Cache<CacheKey, Series>,
}

impl<P: SeriesProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: P, ttl: Duration, max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();
        Self { inner, entries }
    }

    /// Cache sized and timed by the `[data]` section
    pub fn from_config(inner: P, config: &DataConfig) -> Self {
        Self::with_capacity(
            inner,
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_capacity,
        )
    }

    fn key(&self, request: &SeriesRequest) -> CacheKey {
        (self.inner.name().to_string(), request.clone())
    }

    /// Drop every cached entry
    pub fn invalidate(&self) {
        self.entries.invalidate_all();
    }

    /// Drop cached entries for one series identifier
    pub fn invalidate_series(&self, series_id: &str) -> anyhow::Result<()> {
        let series_id = series_id.to_string();
        self.entries
            .invalidate_entries_if(move |(_, request), _| request.series_id == series_id)
            .map_err(|e| anyhow::anyhow!("Failed to invalidate cache entries: {}", e))?;
        Ok(())
    }

    /// Live entries once pending evictions have been applied
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[async_trait]
impl<P: SeriesProvider> SeriesProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> anyhow::Result<Series> {
        let key = self.key(request);
        if let Some(series) = self.entries.get(&key).await {
            tracing::debug!(series = %request.series_id, "Cache hit");
            return Ok(series);
        }

        let series = self.inner.fetch_series(request).await?;
        self.entries.insert(key, series.clone()).await;
        Ok(series)
    }
}

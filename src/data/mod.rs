//! Data ingestion module
//!
//! Providers that hand the analytics core series and intraday bars. Network
//! fetching lives outside this crate; providers here read local Parquet
//! snapshots and cache results explicitly.

mod cache;
mod parquet;
mod provider;

pub use cache::{CachedProvider, DEFAULT_CACHE_CAPACITY};
pub use parquet::{bar_schema, series_schema, SnapshotReader, SnapshotWriter};
pub use provider::ParquetSnapshotProvider;

use crate::series::Series;
use crate::toxicity::Bar;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A series window requested from a provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesRequest {
    /// Provider-side identifier
    pub series_id: String,
    /// Inclusive lower bound
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    pub end: Option<DateTime<Utc>>,
}

impl SeriesRequest {
    /// Request the full history of `series_id`
    pub fn full(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            start: None,
            end: None,
        }
    }

    pub fn between(
        series_id: impl Into<String>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            start,
            end,
        }
    }

    /// Whether `instant` falls inside the requested window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| instant >= s) && self.end.map_or(true, |e| instant <= e)
    }
}

/// Trait for time series sources
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Provider name, part of the cache key
    fn name(&self) -> &str;
    /// Fetch one series, named after the requested identifier
    async fn fetch_series(&self, request: &SeriesRequest) -> anyhow::Result<Series>;
}

/// Trait for intraday bar sources
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// Fetch bars in timestamp order
    async fn fetch_bars(&self, request: &SeriesRequest) -> anyhow::Result<Vec<Bar>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_request_window() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap();
        let request = SeriesRequest::between("WALCL", Some(start), Some(end));

        assert!(request.contains(start));
        assert!(request.contains(end));
        assert!(!request.contains(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()));
        assert!(SeriesRequest::full("WALCL").contains(end));
    }
}

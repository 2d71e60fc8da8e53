//! Snapshot-backed providers

use super::parquet::SnapshotReader;
use super::{BarProvider, SeriesProvider, SeriesRequest};
use crate::series::{Series, TimePoint};
use crate::toxicity::Bar;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Serves series and bars from `<dir>/<id>.parquet` snapshot files
#[derive(Clone)]
pub struct ParquetSnapshotProvider {
    reader: Arc<SnapshotReader>,
}

impl ParquetSnapshotProvider {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            reader: Arc::new(SnapshotReader::new(dir)),
        }
    }
}

#[async_trait]
impl SeriesProvider for ParquetSnapshotProvider {
    fn name(&self) -> &str {
        "parquet"
    }

    async fn fetch_series(&self, request: &SeriesRequest) -> anyhow::Result<Series> {
        let reader = Arc::clone(&self.reader);
        let id = request.series_id.clone();
        let series = tokio::task::spawn_blocking(move || reader.read_series(&id)).await??;

        let points: Vec<TimePoint> = series
            .points()
            .iter()
            .filter(|p| request.contains(p.instant))
            .copied()
            .collect();

        tracing::debug!(
            series = %request.series_id,
            points = points.len(),
            "Loaded series snapshot"
        );
        Ok(Series::new(series.name(), points)?)
    }
}

#[async_trait]
impl BarProvider for ParquetSnapshotProvider {
    async fn fetch_bars(&self, request: &SeriesRequest) -> anyhow::Result<Vec<Bar>> {
        let reader = Arc::clone(&self.reader);
        let id = request.series_id.clone();
        let mut bars = tokio::task::spawn_blocking(move || reader.read_bars(&id)).await??;
        bars.retain(|b| request.contains(b.timestamp));

        tracing::debug!(bars_id = %request.series_id, bars = bars.len(), "Loaded bar snapshot");
        Ok(bars)
    }
}

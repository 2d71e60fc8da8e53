//! Parquet snapshot files for series and intraday bars
//!
//! Values are stored as decimal strings so a snapshot keeps the provider's
//! exact digits; a null value is a missing observation.

use crate::error::DataError;
use crate::series::{Series, TimePoint};
use crate::toxicity::Bar;
use arrow::array::{Array, ArrayRef, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

fn timestamp_field() -> Field {
    Field::new(
        "timestamp",
        DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        false,
    )
}

/// Series snapshot schema
pub fn series_schema() -> Schema {
    Schema::new(vec![
        timestamp_field(),
        Field::new("value", DataType::Utf8, true),
    ])
}

/// Bar snapshot schema
pub fn bar_schema() -> Schema {
    Schema::new(vec![
        timestamp_field(),
        Field::new("close", DataType::Utf8, false),
        Field::new("volume", DataType::Utf8, false),
    ])
}

/// Writes snapshot files under one directory
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Snapshot path for a provider identifier
    pub fn file_path(&self, id: &str) -> PathBuf {
        snapshot_path(&self.output_dir, id)
    }

    fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    fn write_batch(&self, path: &Path, batch: RecordBatch) -> anyhow::Result<()> {
        self.ensure_dir()?;
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    /// Write a series snapshot stored under `id`
    pub fn write_series(&self, id: &str, series: &Series) -> anyhow::Result<PathBuf> {
        let path = self.file_path(id);

        let timestamps: Vec<i64> = series
            .points()
            .iter()
            .map(|p| p.instant.timestamp_micros())
            .collect();
        let values = series
            .points()
            .iter()
            .map(|p| p.value.map(decimal_string).transpose())
            .collect::<anyhow::Result<Vec<Option<String>>>>()?;

        let batch = RecordBatch::try_new(
            Arc::new(series_schema()),
            vec![
                Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC"))
                    as ArrayRef,
                Arc::new(StringArray::from(values)) as ArrayRef,
            ],
        )?;
        self.write_batch(&path, batch)?;

        tracing::debug!(path = ?path, count = series.len(), "Wrote series snapshot");
        Ok(path)
    }

    /// Write a bar snapshot stored under `id`
    pub fn write_bars(&self, id: &str, bars: &[Bar]) -> anyhow::Result<PathBuf> {
        let path = self.file_path(id);

        let timestamps: Vec<i64> = bars.iter().map(|b| b.timestamp.timestamp_micros()).collect();
        let closes = bars
            .iter()
            .map(|b| decimal_string(b.close))
            .collect::<anyhow::Result<Vec<String>>>()?;
        let volumes = bars
            .iter()
            .map(|b| decimal_string(b.volume))
            .collect::<anyhow::Result<Vec<String>>>()?;

        let batch = RecordBatch::try_new(
            Arc::new(bar_schema()),
            vec![
                Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC"))
                    as ArrayRef,
                Arc::new(StringArray::from(closes)) as ArrayRef,
                Arc::new(StringArray::from(volumes)) as ArrayRef,
            ],
        )?;
        self.write_batch(&path, batch)?;

        tracing::debug!(path = ?path, count = bars.len(), "Wrote bar snapshot");
        Ok(path)
    }
}

/// Reads snapshot files from one directory
pub struct SnapshotReader {
    dir: PathBuf,
}

impl SnapshotReader {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn file_path(&self, id: &str) -> PathBuf {
        snapshot_path(&self.dir, id)
    }

    pub fn exists(&self, id: &str) -> bool {
        self.file_path(id).is_file()
    }

    fn read_batches(&self, id: &str) -> anyhow::Result<Vec<RecordBatch>> {
        let path = self.file_path(id);
        if !path.is_file() {
            return Err(DataError::SnapshotNotFound { path }.into());
        }
        let file = File::open(&path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batches = reader.collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    /// Read the series snapshot `id`, named after the identifier
    pub fn read_series(&self, id: &str) -> anyhow::Result<Series> {
        let mut points = Vec::new();

        for batch in self.read_batches(id)? {
            let timestamps = timestamp_column(&batch, id)?;
            let values = string_column(&batch, id, 1, "value")?;

            for i in 0..batch.num_rows() {
                let instant = parse_instant(id, timestamps.value(i))?;
                let point = if values.is_null(i) {
                    TimePoint::missing(instant)
                } else {
                    TimePoint::new(instant, parse_decimal(id, "value", values.value(i))?)
                };
                points.push(point);
            }
        }

        Ok(Series::new(id, points)?)
    }

    /// Read the bar snapshot `id`
    pub fn read_bars(&self, id: &str) -> anyhow::Result<Vec<Bar>> {
        let mut bars = Vec::new();

        for batch in self.read_batches(id)? {
            let timestamps = timestamp_column(&batch, id)?;
            let closes = string_column(&batch, id, 1, "close")?;
            let volumes = string_column(&batch, id, 2, "volume")?;

            for i in 0..batch.num_rows() {
                bars.push(Bar::new(
                    parse_instant(id, timestamps.value(i))?,
                    parse_decimal(id, "close", closes.value(i))?,
                    parse_decimal(id, "volume", volumes.value(i))?,
                ));
            }
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

fn snapshot_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.parquet", id))
}

fn timestamp_column<'a>(
    batch: &'a RecordBatch,
    id: &str,
) -> Result<&'a TimestampMicrosecondArray, DataError> {
    batch
        .column(0)
        .as_any()
        .downcast_ref::<TimestampMicrosecondArray>()
        .ok_or_else(|| DataError::InvalidColumn {
            id: id.to_string(),
            column: "timestamp",
        })
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    id: &str,
    index: usize,
    column: &'static str,
) -> Result<&'a StringArray, DataError> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| DataError::InvalidColumn {
            id: id.to_string(),
            column,
        })
}

fn parse_instant(id: &str, micros: i64) -> Result<DateTime<Utc>, DataError> {
    DateTime::from_timestamp_micros(micros).ok_or_else(|| DataError::InvalidValue {
        id: id.to_string(),
        column: "timestamp",
        value: micros.to_string(),
    })
}

fn parse_decimal(id: &str, column: &'static str, text: &str) -> Result<f64, DataError> {
    let invalid = || DataError::InvalidValue {
        id: id.to_string(),
        column,
        value: text.to_string(),
    };
    let value = Decimal::from_str(text).map_err(|_| invalid())?;
    f64::try_from(value).map_err(|_| invalid())
}

fn decimal_string(value: f64) -> anyhow::Result<String> {
    Ok(Decimal::try_from(value)?.normalize().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_series_schema() {
        let schema = series_schema();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.field(0).name(), "timestamp");
        assert!(schema.field(1).is_nullable());
    }

    #[test]
    fn test_bar_schema() {
        let schema = bar_schema();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(2).name(), "volume");
    }

    #[test]
    fn test_file_path() {
        let writer = SnapshotWriter::new(PathBuf::from("/data"));
        assert_eq!(
            writer.file_path("WALCL"),
            PathBuf::from("/data/WALCL.parquet")
        );
    }

    #[test]
    fn test_write_and_read_series_with_gaps() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(temp_dir.path().to_path_buf());

        let series = Series::new(
            "RRPONTSYD",
            vec![
                TimePoint::missing(day(0)),
                TimePoint::new(day(1), 2_553.716),
                TimePoint::new(day(2), 0.5),
            ],
        )
        .unwrap();
        writer.write_series("RRPONTSYD", &series).unwrap();

        let reader = SnapshotReader::new(temp_dir.path().to_path_buf());
        assert!(reader.exists("RRPONTSYD"));
        let loaded = reader.read_series("RRPONTSYD").unwrap();

        assert_eq!(loaded.name(), "RRPONTSYD");
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.points()[0].value, None);
        assert_eq!(loaded.points()[1].value, Some(2_553.716));
        assert_eq!(loaded.points()[2].instant, day(2));
    }

    #[test]
    fn test_write_and_read_bars() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SnapshotWriter::new(temp_dir.path().to_path_buf());
        let bars = vec![
            Bar::new(day(0), 470.25, 1_200.0),
            Bar::new(day(1), 471.5, 900.0),
        ];
        writer.write_bars("SPY-5m", &bars).unwrap();

        let reader = SnapshotReader::new(temp_dir.path().to_path_buf());
        assert_eq!(reader.read_bars("SPY-5m").unwrap(), bars);
    }

    #[test]
    fn test_read_missing_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let reader = SnapshotReader::new(temp_dir.path().to_path_buf());
        assert!(!reader.exists("nope"));
        let err = reader.read_series("nope").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DataError>(),
            Some(DataError::SnapshotNotFound { .. })
        ));
    }
}

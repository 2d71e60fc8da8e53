//! Toxicity types

use crate::error::{AnalyticsError, AnalyticsResult};
use crate::series::DerivedValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Intraday bar; only close and volume drive classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            close,
            volume,
        }
    }
}

/// Consecutive bars sharing one volume-clock index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeBucket {
    /// floor(cumulative volume / bucket volume)
    pub index: u64,
    pub buy_volume: f64,
    pub sell_volume: f64,
    /// Raw traded volume, including any unclassified first bar
    pub volume: f64,
    pub last_price: f64,
    pub last_timestamp: DateTime<Utc>,
    pub bar_count: usize,
}

impl VolumeBucket {
    /// |buy - sell|
    pub fn order_imbalance(&self) -> f64 {
        (self.buy_volume - self.sell_volume).abs()
    }

    /// Positive when buy pressure dominates
    pub fn signed_imbalance(&self) -> f64 {
        self.buy_volume - self.sell_volume
    }
}

/// A bucket with its rolling toxicity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredBucket {
    pub bucket: VolumeBucket,
    pub order_imbalance: f64,
    /// Undefined until `window` buckets of history exist; may exceed 1
    pub toxicity: DerivedValue,
}

/// How the bucket volume is chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BucketSizing {
    /// A fixed traded volume per bucket
    Fixed { volume: f64 },
    /// Total input volume split into roughly `buckets` buckets
    TotalFraction { buckets: u32 },
}

impl BucketSizing {
    pub fn bucket_volume(&self, bars: &[Bar]) -> AnalyticsResult<f64> {
        match *self {
            BucketSizing::Fixed { volume } => Ok(volume),
            BucketSizing::TotalFraction { buckets: 0 } => Err(AnalyticsError::InvalidParameter(
                "bucket count must be positive".to_string(),
            )),
            BucketSizing::TotalFraction { buckets } => {
                let total: f64 = bars.iter().map(|b| b.volume).sum();
                Ok(total / f64::from(buckets))
            }
        }
    }
}

impl Default for BucketSizing {
    fn default() -> Self {
        BucketSizing::TotalFraction { buckets: 50 }
    }
}

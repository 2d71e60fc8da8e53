//! Volume-clock bucketing and rolling toxicity

use super::classify::buy_probabilities;
use super::{Bar, BucketSizing, ScoredBucket, VolumeBucket};
use crate::error::{AnalyticsError, AnalyticsResult};
use crate::series::{DerivedValue, UndefinedReason};

/// VPIN engine for a fixed bucket volume and rolling window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToxicityEngine {
    bucket_volume: f64,
    window: usize,
}

impl ToxicityEngine {
    pub fn new(bucket_volume: f64, window: usize) -> AnalyticsResult<Self> {
        if !bucket_volume.is_finite() || bucket_volume <= 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "bucket volume must be positive, got {bucket_volume}"
            )));
        }
        if window == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "toxicity window must be positive".to_string(),
            ));
        }
        Ok(Self {
            bucket_volume,
            window,
        })
    }

    /// Engine whose bucket volume comes from a sizing rule applied to `bars`
    pub fn with_sizing(sizing: BucketSizing, bars: &[Bar], window: usize) -> AnalyticsResult<Self> {
        Self::new(sizing.bucket_volume(bars)?, window)
    }

    pub fn bucket_volume(&self) -> f64 {
        self.bucket_volume
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Bucket `bars` on the volume clock and score each bucket.
    ///
    /// Fewer than two bars cannot be classified and yield no buckets.
    pub fn compute(&self, bars: &[Bar]) -> AnalyticsResult<Vec<ScoredBucket>> {
        if bars.len() < 2 {
            return Ok(Vec::new());
        }
        validate(bars)?;

        let buckets = self.aggregate(bars);
        tracing::debug!(
            bars = bars.len(),
            buckets = buckets.len(),
            bucket_volume = self.bucket_volume,
            window = self.window,
            "Aggregated volume buckets"
        );
        Ok(self.score(buckets))
    }

    fn aggregate(&self, bars: &[Bar]) -> Vec<VolumeBucket> {
        let probabilities = buy_probabilities(bars);
        let mut buckets: Vec<VolumeBucket> = Vec::new();
        let mut cumulative = 0.0;

        for (bar, p_buy) in bars.iter().zip(probabilities) {
            cumulative += bar.volume;
            let index = (cumulative / self.bucket_volume).floor() as u64;
            let (buy, sell) = match p_buy {
                Some(p) => (bar.volume * p, bar.volume * (1.0 - p)),
                None => (0.0, 0.0),
            };

            match buckets.last_mut() {
                Some(bucket) if bucket.index == index => {
                    bucket.buy_volume += buy;
                    bucket.sell_volume += sell;
                    bucket.volume += bar.volume;
                    bucket.last_price = bar.close;
                    bucket.last_timestamp = bar.timestamp;
                    bucket.bar_count += 1;
                }
                _ => buckets.push(VolumeBucket {
                    index,
                    buy_volume: buy,
                    sell_volume: sell,
                    volume: bar.volume,
                    last_price: bar.close,
                    last_timestamp: bar.timestamp,
                    bar_count: 1,
                }),
            }
        }

        buckets
    }

    fn score(&self, buckets: Vec<VolumeBucket>) -> Vec<ScoredBucket> {
        let imbalances: Vec<f64> = buckets.iter().map(VolumeBucket::order_imbalance).collect();
        let denominator = self.bucket_volume * self.window as f64;

        buckets
            .into_iter()
            .enumerate()
            .map(|(i, bucket)| {
                let toxicity = if i + 1 < self.window {
                    DerivedValue::Undefined(UndefinedReason::InsufficientHistory)
                } else {
                    let trailing: f64 = imbalances[i + 1 - self.window..=i].iter().sum();
                    DerivedValue::Defined(trailing / denominator)
                };
                ScoredBucket {
                    order_imbalance: imbalances[i],
                    bucket,
                    toxicity,
                }
            })
            .collect()
    }
}

/// VPIN over `bars` with a fixed bucket volume
pub fn compute_toxicity(
    bars: &[Bar],
    bucket_volume: f64,
    window: usize,
) -> AnalyticsResult<Vec<ScoredBucket>> {
    ToxicityEngine::new(bucket_volume, window)?.compute(bars)
}

fn validate(bars: &[Bar]) -> AnalyticsResult<()> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.close.is_finite() || !bar.volume.is_finite() || bar.volume < 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "bar {i} at {} has close {} and volume {}",
                bar.timestamp, bar.close, bar.volume
            )));
        }
    }
    if let Some(i) = bars
        .windows(2)
        .position(|w| w[1].timestamp < w[0].timestamp)
    {
        return Err(AnalyticsError::InvalidParameter(format!(
            "bars out of order at position {}",
            i + 1
        )));
    }
    Ok(())
}

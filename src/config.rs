//! Configuration types for liquidity-monitor

use crate::error::AnalyticsResult;
use crate::metric::UnitScale;
use crate::signal::{FitThresholds, StressThresholds, ToxicityThresholds};
use crate::telemetry::LogFormat;
use crate::toxicity::BucketSizing;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub series: Vec<SeriesConfig>,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub model: Option<ModelConfig>,
    pub toxicity: Option<ToxicityConfig>,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Snapshot storage, observation window and provider cache
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    pub snapshot_dir: PathBuf,
    /// Days of history requested from providers, counted back from now
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

fn default_lookback_days() -> u32 {
    730
}
fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_cache_capacity() -> u64 {
    crate::data::DEFAULT_CACHE_CAPACITY
}

impl DataConfig {
    /// Earliest instant requested from providers
    ///
    /// Truncated to midnight UTC so runs on the same day issue the same
    /// request and share cache entries.
    pub fn observation_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        (now - Duration::days(i64::from(self.lookback_days)))
            .date_naive()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }
}

/// One input series and how it is ingested
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeriesConfig {
    /// Panel column name
    pub name: String,
    /// Provider-side series identifier
    pub source_id: String,
    /// Divisor bringing the series onto its metric's unit
    #[serde(default = "default_unit_scale")]
    pub unit_scale: Decimal,
    /// Treat values before the first observation as zero
    #[serde(default)]
    pub zero_fill_before_inception: bool,
}

fn default_unit_scale() -> Decimal {
    Decimal::ONE
}

impl SeriesConfig {
    pub fn scale(&self) -> AnalyticsResult<UnitScale> {
        UnitScale::try_from(self.unit_scale)
    }
}

/// Column roles for the canonical metrics
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    pub net_liquidity: Option<NetLiquidityConfig>,
    pub stress_spread: Option<StressSpreadConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetLiquidityConfig {
    pub asset_base: String,
    pub drawdown_account: String,
    pub overnight_facility: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StressSpreadConfig {
    pub high_risk: String,
    pub medium_risk: String,
}

/// Fair value regression configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default = "default_independent")]
    pub independent: String,
    pub dependent: String,
    pub training_start_year: i32,
    pub display_start_year: Option<i32>,
    /// Trailing SMA window for the regressor; off when absent
    pub smoothing_window: Option<usize>,
    #[serde(default = "default_min_training_rows")]
    pub min_training_rows: usize,
}

fn default_independent() -> String {
    crate::metric::NET_LIQUIDITY.to_string()
}
fn default_min_training_rows() -> usize {
    crate::model::MIN_TRAINING_ROWS
}

/// VPIN configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToxicityConfig {
    /// Provider identifier of the intraday bar snapshot
    pub bars_id: String,
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default)]
    pub bucket_sizing: BucketSizing,
}

fn default_window() -> usize {
    50
}

/// Alert thresholds applied by callers, never by the engines
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub stress: StressThresholds,
    #[serde(default)]
    pub fit: FitThresholds,
    #[serde(default)]
    pub toxicity: ToxicityThresholds,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-references between sections
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.data.lookback_days == 0 {
            anyhow::bail!("data.lookback_days must be positive");
        }
        if self.alerts.stress.lookback == 0 {
            anyhow::bail!("alerts.stress.lookback must be positive");
        }
        if let Some(toxicity) = &self.toxicity {
            if toxicity.window == 0 {
                anyhow::bail!("toxicity.window must be positive");
            }
        }

        let mut names = BTreeSet::new();
        for series in &self.series {
            if !names.insert(series.name.as_str()) {
                anyhow::bail!("series {} declared more than once", series.name);
            }
            series.scale()?;
        }

        let mut referenced: Vec<&str> = Vec::new();
        if let Some(net) = &self.metrics.net_liquidity {
            referenced.extend([
                net.asset_base.as_str(),
                net.drawdown_account.as_str(),
                net.overnight_facility.as_str(),
            ]);
        }
        if let Some(stress) = &self.metrics.stress_spread {
            referenced.extend([stress.high_risk.as_str(), stress.medium_risk.as_str()]);
        }
        if let Some(unknown) = referenced.iter().find(|n| !names.contains(*n)) {
            anyhow::bail!("metric references undeclared series {unknown}");
        }
        Ok(())
    }

    pub fn series_config(&self, name: &str) -> Option<&SeriesConfig> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Names of series flagged zero-fill-before-inception
    pub fn zero_fill_series(&self) -> BTreeSet<String> {
        self.series
            .iter()
            .filter(|s| s.zero_fill_before_inception)
            .map(|s| s.name.clone())
            .collect()
    }
}

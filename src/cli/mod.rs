//! CLI interface for liquidity-monitor
//!
//! Provides subcommands for:
//! - `analyze`: Full liquidity, stress and fair value report
//! - `toxicity`: VPIN over intraday bars only
//! - `config`: Show effective configuration

mod analyze;
mod toxicity;

pub use analyze::AnalyzeArgs;
pub use toxicity::ToxicityArgs;

use crate::config::Config;
use crate::data::{BarProvider, ParquetSnapshotProvider, SeriesProvider};
use crate::monitor::Monitor;
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "liquidity-monitor")]
#[command(about = "Liquidity and credit stress analytics over series snapshots")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Full liquidity, stress and fair value report
    Analyze(AnalyzeArgs),
    /// Order-flow toxicity over intraday bars
    Toxicity(ToxicityArgs),
    /// Show effective configuration
    Config,
}

/// Report output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Monitor over the configured snapshot directory
///
/// Each command runs once and exits, so snapshots are read directly.
/// Long-lived callers wrap the provider in `CachedProvider` instead.
fn snapshot_monitor(config: Config) -> Monitor {
    let snapshots = ParquetSnapshotProvider::new(config.data.snapshot_dir.clone());
    let series: Arc<dyn SeriesProvider> = Arc::new(snapshots.clone());
    let bars: Arc<dyn BarProvider> = Arc::new(snapshots);
    Monitor::new(config, series, Some(bars))
}

/// Print the effective configuration as TOML
pub fn show_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

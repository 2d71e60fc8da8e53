//! Analyze command implementation

use super::{snapshot_monitor, OutputFormat};
use crate::config::Config;
use clap::Args;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// First year of the regression training window
    #[arg(long)]
    pub training_start: Option<i32>,

    /// First year shown in the report
    #[arg(long)]
    pub display_start: Option<i32>,

    /// Trailing SMA window applied to the regressor
    #[arg(long)]
    pub smoothing: Option<usize>,

    /// Days of history requested per series
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub lookback_days: Option<u32>,
}

impl AnalyzeArgs {
    /// Configuration with command-line overrides applied
    pub fn apply(&self, config: &Config) -> anyhow::Result<Config> {
        let mut config = config.clone();
        if let Some(days) = self.lookback_days {
            config.data.lookback_days = days;
        }
        let overrides =
            self.training_start.is_some() || self.display_start.is_some() || self.smoothing.is_some();
        if !overrides {
            return Ok(config);
        }

        let Some(model) = config.model.as_mut() else {
            anyhow::bail!("model overrides given but no [model] section configured");
        };
        if let Some(year) = self.training_start {
            model.training_start_year = year;
        }
        if let Some(year) = self.display_start {
            model.display_start_year = Some(year);
        }
        if let Some(window) = self.smoothing {
            model.smoothing_window = Some(window);
        }
        Ok(config)
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let monitor = snapshot_monitor(self.apply(config)?);
        tracing::info!(snapshot_dir = ?config.data.snapshot_dir, "Running analysis");

        let report = monitor.run().await?;
        match self.format {
            OutputFormat::Table => println!("{}", report.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
        Ok(())
    }
}

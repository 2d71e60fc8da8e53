//! Toxicity command implementation

use super::{snapshot_monitor, OutputFormat};
use crate::config::Config;
use crate::toxicity::BucketSizing;
use clap::Args;

#[derive(Args, Debug)]
pub struct ToxicityArgs {
    /// Fixed traded volume per bucket, overriding the configured sizing
    #[arg(long)]
    pub bucket_volume: Option<f64>,

    /// Rolling window in buckets
    #[arg(long)]
    pub window: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl ToxicityArgs {
    /// Configuration with command-line overrides applied
    pub fn apply(&self, config: &Config) -> anyhow::Result<Config> {
        let mut config = config.clone();
        let Some(toxicity) = config.toxicity.as_mut() else {
            anyhow::bail!("no [toxicity] section configured");
        };
        if let Some(volume) = self.bucket_volume {
            toxicity.bucket_sizing = BucketSizing::Fixed { volume };
        }
        if let Some(window) = self.window {
            toxicity.window = window;
        }
        Ok(config)
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let monitor = snapshot_monitor(self.apply(config)?);
        let summary = monitor.toxicity().await?;
        match self.format {
            OutputFormat::Table => println!("{}", summary.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        Ok(())
    }
}

use clap::Parser;
use liquidity_monitor::cli::{show_config, Cli, Commands};
use liquidity_monitor::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using bundled example configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    let _telemetry = liquidity_monitor::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Analyze(args) => {
            tracing::info!("Starting analysis");
            args.execute(&config).await?;
        }
        Commands::Toxicity(args) => {
            tracing::info!("Starting toxicity scoring");
            args.execute(&config).await?;
        }
        Commands::Config => show_config(&config)?,
    }

    Ok(())
}

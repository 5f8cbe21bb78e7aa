//! Antarctic Explorer CLI
//!
//! Command-line interface for the live temperature dashboard.

use std::path::PathBuf;

use antarctic_explorer::{load_config, Config, ConfigOverrides};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "antarctic-explorer")]
#[command(about = "Live temperature dashboard with bounded history and trend line")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long, env = "ANTARCTIC_DASHBOARD_PORT")]
    dashboard_port: Option<u16>,

    /// Seconds between readings (overrides config file)
    #[arg(long, env = "ANTARCTIC_REFRESH_INTERVAL_SECONDS")]
    refresh_interval_seconds: Option<u64>,

    /// Number of readings kept in history (overrides config file)
    #[arg(long, env = "ANTARCTIC_HISTORY_CAPACITY")]
    capacity: Option<usize>,

    /// Lower bound of generated readings in °C (overrides config file)
    #[arg(long, env = "ANTARCTIC_MIN_VALUE", allow_negative_numbers = true)]
    min_value: Option<f64>,

    /// Upper bound of generated readings in °C (overrides config file)
    #[arg(long, env = "ANTARCTIC_MAX_VALUE", allow_negative_numbers = true)]
    max_value: Option<f64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dashboard_port: self.dashboard_port,
            refresh_interval_seconds: self.refresh_interval_seconds,
            capacity: self.capacity,
            min_value: self.min_value,
            max_value: self.max_value,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, overrides={:?}, log_level={:?}",
        args.config,
        args.overrides(),
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    config.apply_overrides(&args.overrides());

    config.validate()?;

    tracing::info!("Starting antarctic explorer");
    antarctic_explorer::run(config).await?;

    Ok(())
}

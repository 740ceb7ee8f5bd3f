//! # Paddle Forecast Application Entry Point
//!
//! This binary wires configuration, logging and the conditions service
//! together and prints the result. Live providers are tried first; when they
//! fail, or with `--offline`, the deterministic synthetic sources answer
//! instead and the output is marked `⚠ OFFLINE`.
//!
//! ```text
//! paddle-forecast [--config PATH] [--offline] [now | day [--date YYYY-MM-DD] | extended | json | init [--force]]
//! ```
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`), so
//! stdout carries only the forecast.

#[cfg(test)]
mod tests;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use paddle_forecast_lib::config::{Config, CONFIG_FILE};
use paddle_forecast_lib::forecast::ConditionsService;
use paddle_forecast_lib::renderer::{draw_current, draw_daily, draw_extended};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "paddle-forecast")]
#[command(about = "Paddling conditions between Ian Shaw Park and Bucklands Beach", long_about = None)]
struct Cli {
    /// Configuration file [default: paddle-config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip live providers and use synthetic weather and tides
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
enum Commands {
    /// Current conditions and leg recommendation
    Now,
    /// Hourly forecast for one day
    Day {
        /// Local date, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Today and tomorrow
    Extended,
    /// Today and tomorrow as JSON
    Json,
    /// Write a default configuration file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn config_path(cli: &Cli) -> &Path {
    cli.config.as_deref().unwrap_or(Path::new(CONFIG_FILE))
}

/// Configuration file, then API keys from the environment, then flags.
fn resolve_config(cli: &Cli) -> Config {
    let loaded = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let mut config = loaded.with_env_overrides();
    if cli.offline {
        config.sources.offline = true;
    }
    config
}

/// Write the default configuration, refusing to clobber a file unless forced.
fn write_default_config(cli: &Cli, force: bool) -> anyhow::Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        bail!("{} already exists, pass --force to replace it", path.display());
    }
    let config = Config::default();
    match &cli.config {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let command = cli.command.clone().unwrap_or(Commands::Now);
    if let Commands::Init { force } = command {
        return write_default_config(&cli, force);
    }

    let service = ConditionsService::from_config(config);
    let display = &service.config().display;

    match command {
        Commands::Now => {
            let current = service.current_assessment().await;
            draw_current(&current);
        }
        Commands::Day { date } => {
            let date = date.unwrap_or_else(|| service.now().date_naive());
            let forecast = service.daily_forecast(date).await;
            draw_daily(&forecast, &date.format("%A").to_string(), display);
        }
        Commands::Extended => {
            let forecast = service.extended_forecast().await;
            draw_extended(&forecast, display);
        }
        Commands::Json => {
            let forecast = service.extended_forecast().await;
            let json =
                serde_json::to_string_pretty(&forecast).context("serialize extended forecast")?;
            println!("{json}");
        }
        // written before the service was built
        Commands::Init { .. } => {}
    }
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli);
    info!(
        site = %config.site.name,
        offline = config.sources.offline,
        "starting paddle forecast"
    );

    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    rt.block_on(run(cli, config))
}

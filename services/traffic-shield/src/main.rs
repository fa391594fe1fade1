//! TrafficShield CLI
//!
//! Command-line interface for the simulated traffic monitoring service.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use traffic_shield::{load_config, Config};

#[derive(Parser)]
#[command(name = "traffic-shield")]
#[command(about = "Simulated smart-traffic monitoring service")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    dashboard_port: Option<u16>,

    /// Device to simulate on startup (overrides config file)
    #[arg(short, long)]
    device: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, dashboard_port={:?}, device={:?}, log_level={:?}",
        args.config,
        args.dashboard_port,
        args.device,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(dashboard_port) = args.dashboard_port {
        config.dashboard.port = dashboard_port;
    }
    if let Some(device) = args.device {
        config.simulator.initial_device = device;
    }

    tracing::info!("Starting traffic-shield service");
    tracing::debug!(
        "Devices: {}, tick interval: {} ms",
        config.devices.len(),
        config.simulator.tick_interval_ms
    );

    traffic_shield::run(config).await?;

    Ok(())
}

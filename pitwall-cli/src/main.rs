//! ## pitwall-cli
//! **Command-line frontend for the telemetry simulator**
//!
//! Deterministic simulation with digest validation, live runs on the wall
//! clock, repository queries and a metrics dump.

use std::sync::Arc;

use anyhow::anyhow;
use clap::Parser;
use pitwall_config::PitwallConfig;
use pitwall_telemetry::{EventLogger, MetricsRecorder};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = PitwallConfig::resolve(cli.config.as_ref())?;
    EventLogger::init(&config.telemetry.log_level)
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))?;
    let metrics = Arc::new(MetricsRecorder::new()?);

    match cli.command {
        Commands::Simulate(args) => commands::simulate(&config, args, metrics),
        Commands::Run(args) => commands::run(&config, args, metrics).await,
        Commands::Query(args) => commands::query(&config, args, metrics),
        Commands::Metrics(args) => commands::metrics(&config, args, metrics),
    }
}

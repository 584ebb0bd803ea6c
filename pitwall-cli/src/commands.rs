use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::warn;

use pitwall_config::PitwallConfig;
use pitwall_engine::{run_live_mode, run_simulation_mode};
use pitwall_storage::{QueryParams, RawQuery};
use pitwall_telemetry::MetricsRecorder;

#[derive(Parser)]
#[command(name = "pitwall", version, about)]
pub struct Cli {
    /// YAML configuration file layered over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a deterministic simulation and print its report
    Simulate(SimulateArgs),
    /// Stream live telemetry on the wall clock
    Run(RunArgs),
    /// Simulate, then print one page of stored samples
    Query(QueryArgs),
    /// Simulate, then print Prometheus metrics
    Metrics(SeedArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SeedArgs {
    #[arg(long, default_value_t = 42)]
    pub seed: u32,
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 1_000)]
    pub ticks: usize,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub run: SeedArgs,
    /// Expected blake3 digest; a mismatch fails the command
    #[arg(long)]
    pub validate_hash: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Seed for the generator; random when omitted
    #[arg(long)]
    pub seed: Option<u32>,
    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(long)]
    pub duration_secs: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub run: SeedArgs,
    /// Inclusive lower bound, epoch ms
    #[arg(long)]
    pub from: Option<String>,
    /// Exclusive upper bound, epoch ms
    #[arg(long)]
    pub to: Option<String>,
    #[arg(long)]
    pub limit: Option<String>,
    #[arg(long)]
    pub cursor: Option<String>,
}

pub fn simulate(
    config: &PitwallConfig,
    args: SimulateArgs,
    metrics: Arc<MetricsRecorder>,
) -> anyhow::Result<()> {
    let (report, _) = run_simulation_mode(
        config,
        args.run.seed,
        args.run.ticks,
        args.validate_hash.as_deref(),
        metrics,
    )?;
    print!("{}", serde_yaml::to_string(&report)?);
    Ok(())
}

pub async fn run(
    config: &PitwallConfig,
    args: RunArgs,
    metrics: Arc<MetricsRecorder>,
) -> anyhow::Result<()> {
    let duration = args.duration_secs.map(Duration::from_secs);
    let report = run_live_mode(config, args.seed, duration, metrics).await?;
    print!("{}", serde_yaml::to_string(&report)?);
    Ok(())
}

pub fn query(
    config: &PitwallConfig,
    args: QueryArgs,
    metrics: Arc<MetricsRecorder>,
) -> anyhow::Result<()> {
    let params = QueryParams::parse(
        RawQuery {
            from: args.from.as_deref(),
            to: args.to.as_deref(),
            limit: args.limit.as_deref(),
            cursor: args.cursor.as_deref(),
        },
        config.storage.max_limit,
    )
    .context("invalid query parameters")?;

    let (_, session) = run_simulation_mode(config, args.run.seed, args.run.ticks, None, metrics)?;
    let page = session.query(&params)?;
    print!("{}", serde_yaml::to_string(&page)?);
    Ok(())
}

pub fn metrics(
    config: &PitwallConfig,
    args: SeedArgs,
    metrics: Arc<MetricsRecorder>,
) -> anyhow::Result<()> {
    if !config.telemetry.metrics_enabled {
        bail!("metrics are disabled by configuration (telemetry.metrics_enabled = false)");
    }
    let (report, _) =
        run_simulation_mode(config, args.seed, args.ticks, None, Arc::clone(&metrics))?;
    if report.dropped > 0 {
        warn!(dropped = report.dropped, "some ticks produced invalid samples");
    }
    print!("{}", metrics.gather_metrics()?);
    Ok(())
}

// pitwall-engine/src/runtime.rs

/*!
# Run Modes

- **Simulation mode:** synchronous, virtual clock, reproducible digest.
- **Live mode:** tokio-driven engine on the wall clock until a deadline or Ctrl-C.
*/

use std::sync::Arc;
use std::time::Duration;

use blake3::Hasher;
use opentelemetry::KeyValue;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{error, info, instrument};

use pitwall_config::PitwallConfig;
use pitwall_core::time::{SystemClock, VirtualClock};
use pitwall_core::Sample;
use pitwall_detection::Alert;
use pitwall_simulator::{EngineStats, Simulation, TelemetryEngine, TickOutcome};
use pitwall_telemetry::{EventLogger, MetricsRecorder};

use crate::error::SessionError;
use crate::session::VehicleSession;

/// Summary of a deterministic run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub vehicle_id: String,
    pub seed: u32,
    pub ticks: usize,
    pub emitted: u64,
    pub dropped: u64,
    /// blake3 over every tick outcome, hex encoded.
    pub digest: String,
    pub final_timestamp: Option<u64>,
    pub active_alerts: Vec<Alert>,
    pub history_len: usize,
    pub repository_size: usize,
}

/// Summary of a live run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveReport {
    pub vehicle_id: String,
    pub stats: EngineStats,
    pub active_alerts: Vec<Alert>,
    pub history_len: usize,
    pub repository_size: usize,
}

/// Runs `ticks` ticks on a virtual clock starting at 0 and feeds every sample
/// through a fresh session.
///
/// When `validate_hash` is given, a differing digest is an error.
#[instrument(level = "info", name = "run_simulation_mode", skip(config, metrics))]
pub fn run_simulation_mode(
    config: &PitwallConfig,
    seed: u32,
    ticks: usize,
    validate_hash: Option<&str>,
    metrics: Arc<MetricsRecorder>,
) -> Result<(SimulationReport, VehicleSession), SessionError> {
    let mut simulation = Simulation::new(&config.engine, seed, Arc::new(VirtualClock::new(0)))?;
    let session = VehicleSession::new(config, metrics)?;

    let mut hasher = Hasher::new();
    let (mut emitted, mut dropped) = (0u64, 0u64);
    let mut final_timestamp = None;

    for _ in 0..ticks {
        match simulation.step() {
            TickOutcome::Emitted(sample) => {
                emitted += 1;
                hash_sample(&mut hasher, &sample);
                final_timestamp = Some(sample.timestamp);
                session.record_emitted();
                session.ingest(&sample);
            }
            TickOutcome::Dropped(error) => {
                dropped += 1;
                hasher.update(b"DROPPED");
                session.record_dropped(&error);
            }
        }
    }

    let digest = hex::encode(hasher.finalize().as_bytes());
    info!(seed, ticks, emitted, dropped, %digest, "Simulation complete");

    if let Some(expected) = validate_hash {
        if !expected.eq_ignore_ascii_case(&digest) {
            error!("Hash mismatch! Expected: {expected}");
            EventLogger::log_event(
                "hash_mismatch",
                vec![
                    KeyValue::new("seed", i64::from(seed)),
                    KeyValue::new("expected", expected.to_string()),
                    KeyValue::new("actual", digest.clone()),
                ],
            );
            return Err(SessionError::HashMismatch {
                expected: expected.to_string(),
                actual: digest,
            });
        }
        info!("Digest validation successful");
    }

    EventLogger::log_event(
        "simulation_complete",
        vec![
            KeyValue::new("ticks", ticks as i64),
            KeyValue::new("seed", i64::from(seed)),
            KeyValue::new("digest", digest.clone()),
        ],
    );

    let report = SimulationReport {
        vehicle_id: session.vehicle_id().to_string(),
        seed,
        ticks,
        emitted,
        dropped,
        digest,
        final_timestamp,
        active_alerts: session.active_alerts(),
        history_len: session.history_len(),
        repository_size: session.repository().size(),
    };
    Ok((report, session))
}

/// Drives a live engine on the wall clock.
///
/// Stops after `duration` when given, otherwise on Ctrl-C. `seed` of `None`
/// picks a random seed, which is logged.
#[instrument(level = "info", name = "run_live_mode", skip(config, metrics))]
pub async fn run_live_mode(
    config: &PitwallConfig,
    seed: Option<u32>,
    duration: Option<Duration>,
    metrics: Arc<MetricsRecorder>,
) -> Result<LiveReport, SessionError> {
    let clock = Arc::new(SystemClock::new());
    let engine = match seed {
        Some(seed) => TelemetryEngine::with_seed(&config.engine, seed, clock)?,
        None => TelemetryEngine::new(&config.engine, clock)?,
    };
    let session = Arc::new(VehicleSession::new(config, Arc::clone(&metrics))?);

    let subscription = engine.subscribe({
        let session = Arc::clone(&session);
        move |sample: &Sample| {
            session.record_emitted();
            session.ingest(sample);
        }
    });

    if !engine.start(None) {
        return Err(SessionError::Start("engine refused to start".into()));
    }
    info!(seed = engine.stats().seed, "Live mode running");

    match duration {
        Some(limit) => {
            tokio::select! {
                _ = sleep(limit) => info!("Run duration elapsed"),
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    info!("Interrupted");
                }
            }
        }
        None => {
            tokio::signal::ctrl_c().await?;
            info!("Interrupted");
        }
    }

    engine.stop();
    drop(subscription);

    let stats = engine.stats();
    metrics.samples_dropped.inc_by(stats.dropped);
    EventLogger::log_event(
        "live_complete",
        vec![
            KeyValue::new("seed", i64::from(stats.seed)),
            KeyValue::new("emitted", stats.emitted as i64),
        ],
    );

    Ok(LiveReport {
        vehicle_id: session.vehicle_id().to_string(),
        stats,
        active_alerts: session.active_alerts(),
        history_len: session.history_len(),
        repository_size: session.repository().size(),
    })
}

/// Canonical byte encoding of a sample: fixed field order, little-endian
/// integers, IEEE-754 bit patterns for floats.
fn hash_sample(hasher: &mut Hasher, sample: &Sample) {
    hasher.update(&sample.timestamp.to_le_bytes());
    hasher.update(&(sample.vehicle_id.len() as u64).to_le_bytes());
    hasher.update(sample.vehicle_id.as_bytes());
    for value in [
        sample.speed_kph,
        sample.rpm,
        sample.throttle_pct,
        sample.brake_pct,
        sample.steering_deg,
        sample.coolant_c,
        sample.oil_c,
        sample.battery_v,
        sample.state_of_charge,
        sample.tire_temps.fl,
        sample.tire_temps.fr,
        sample.tire_temps.rl,
        sample.tire_temps.rr,
        sample.latitude,
        sample.longitude,
    ] {
        hasher.update(&value.to_bits().to_le_bytes());
    }
    hasher.update(&[sample.gear, sample.sector]);
    hasher.update(&sample.lap.to_le_bytes());
}

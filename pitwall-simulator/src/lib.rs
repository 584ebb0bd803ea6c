// pitwall-simulator/src/lib.rs

/*!
# Pitwall Simulator

Deterministic telemetry generator for one vehicle. A seeded random source,
a tick-driven physics approximation and an anomaly injector produce a smooth,
bounded and occasionally anomalous stream of [`Sample`]s. Two runs with the
same seed and tick count produce identical streams.

## Key Components:
- **Simulation:** synchronous state machine, one [`Simulation::advance`] per tick.
- **Physics:** ordered per-tick update of inputs, drivetrain, temperatures and battery.
- **Anomaly injector:** occasional coolant overheating episodes.
- **Track:** lap/sector bookkeeping and a placeholder position path.
- **TelemetryEngine:** tokio driver with `start`/`stop`/`is_running` and subscriptions.
*/

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use pitwall_config::EngineConfig;
use pitwall_core::time::Clock;
use pitwall_core::{ConfigurationError, DeterministicRng, Sample, TireTemps, ValidationError};

pub mod anomaly;
pub mod driver;
pub mod physics;
pub mod settings;
pub mod state;
pub mod track;

pub use driver::{EngineStats, TelemetryEngine};
pub use settings::EngineSettings;
pub use state::EngineState;

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A valid sample was produced.
    Emitted(Sample),
    /// The assembled sample broke an invariant and was discarded.
    Dropped(ValidationError),
}

impl TickOutcome {
    pub fn sample(&self) -> Option<&Sample> {
        match self {
            TickOutcome::Emitted(sample) => Some(sample),
            TickOutcome::Dropped(_) => None,
        }
    }

    pub fn into_sample(self) -> Option<Sample> {
        match self {
            TickOutcome::Emitted(sample) => Some(sample),
            TickOutcome::Dropped(_) => None,
        }
    }
}

/// One vehicle's simulation: settings, generator, state and clock.
///
/// Random draws happen in this order, forever: the inter-tick delay, then the
/// physics draws of the tick that delay precedes.
pub struct Simulation {
    settings: EngineSettings,
    rng: DeterministicRng,
    state: EngineState,
    clock: Arc<dyn Clock>,
    /// Sub-millisecond time not yet handed to the clock.
    pending: Duration,
    ticks: u64,
}

impl Simulation {
    /// Creates a simulation seeded with `seed`.
    ///
    /// Fails on non-positive tick bounds, non-positive max rpm or a malformed
    /// gear ratio table.
    pub fn new(
        config: &EngineConfig,
        seed: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigurationError> {
        let settings = EngineSettings::from_config(config)?;
        let state = EngineState::initial(settings.origin_lat, settings.origin_lon);
        Ok(Self {
            settings,
            rng: DeterministicRng::seed(seed),
            state,
            clock,
            pending: Duration::ZERO,
            ticks: 0,
        })
    }

    /// Restores the initial state; reseeds the generator when `seed` is given.
    pub fn reset(&mut self, seed: Option<u32>) {
        if let Some(seed) = seed {
            self.rng = DeterministicRng::seed(seed);
        }
        self.state = EngineState::initial(self.settings.origin_lat, self.settings.origin_lon);
        self.pending = Duration::ZERO;
        self.ticks = 0;
    }

    /// Draws the delay before the next tick, uniform in `[min_tick, max_tick)`.
    pub fn next_tick_delay(&mut self) -> Duration {
        let ms = self.rng.uniform(
            self.settings.min_tick_ms as f64,
            self.settings.max_tick_ms as f64,
        );
        Duration::from_secs_f64(ms / 1_000.0)
    }

    /// Runs one tick covering `elapsed` of simulated time.
    ///
    /// `elapsed` should be the delay drawn by [`Self::next_tick_delay`]; the
    /// physics never looks at the wall clock.
    pub fn advance(&mut self, elapsed: Duration) -> TickOutcome {
        let dt_s = elapsed.as_secs_f64();
        self.pending += elapsed;
        let whole_ms = self.pending.as_millis() as u64;
        self.pending -= Duration::from_millis(whole_ms);
        self.clock.advance(whole_ms);

        let state = &mut self.state;
        let rng = &mut self.rng;
        let settings = &self.settings;

        physics::drive_inputs(state, rng);
        physics::integrate_speed(state, dt_s);
        physics::drivetrain(state, settings);
        physics::fluid_temperatures(state, rng);
        if anomaly::inject(state, rng) {
            debug!(
                vehicle = %settings.vehicle_id,
                ticks = state.anomaly_cooldown,
                "coolant anomaly armed"
            );
        }
        physics::battery(state, rng);
        physics::tire_temperatures(state, rng);
        track::advance_distance(state, settings, dt_s);
        let (latitude, longitude) = track::position(settings, state.distance_m);
        state.latitude = latitude;
        state.longitude = longitude;

        self.ticks += 1;
        let sample = self.assemble();
        match sample.validate(self.settings.max_gear()) {
            Ok(()) => {
                trace!(tick = self.ticks, timestamp = sample.timestamp, "sample emitted");
                TickOutcome::Emitted(sample)
            }
            Err(error) => {
                debug!(tick = self.ticks, %error, "dropping invalid sample");
                TickOutcome::Dropped(error)
            }
        }
    }

    /// Draws a delay and runs the tick it precedes.
    pub fn step(&mut self) -> TickOutcome {
        let delay = self.next_tick_delay();
        self.advance(delay)
    }

    /// Runs `count` ticks, keeping only emitted samples.
    pub fn run(&mut self, count: usize) -> Vec<Sample> {
        (0..count).filter_map(|_| self.step().into_sample()).collect()
    }

    fn assemble(&self) -> Sample {
        let s = &self.state;
        Sample {
            timestamp: self.clock.now_ms(),
            vehicle_id: self.settings.vehicle_id.clone(),
            speed_kph: s.speed_kph,
            rpm: s.rpm,
            gear: s.gear,
            throttle_pct: s.throttle_pct,
            brake_pct: s.brake_pct,
            steering_deg: s.steering_deg,
            coolant_c: s.coolant_c,
            oil_c: s.oil_c,
            battery_v: s.battery_v,
            state_of_charge: s.state_of_charge,
            tire_temps: TireTemps {
                fl: s.tire_temps[0],
                fr: s.tire_temps[1],
                rl: s.tire_temps[2],
                rr: s.tire_temps[3],
            },
            latitude: s.latitude,
            longitude: s.longitude,
            lap: s.lap,
            sector: s.sector,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn seed(&self) -> u32 {
        self.rng.initial_seed()
    }

    /// Ticks run since the last reset, dropped ones included.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

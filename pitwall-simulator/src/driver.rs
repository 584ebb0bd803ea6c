//! Live tokio driver around a [`Simulation`].
//!
//! The driver loop draws the next delay, sleeps for it, advances the
//! simulation by exactly that delay and publishes the sample after releasing
//! the simulation lock. Stopping flips a flag and bumps a generation counter so
//! a tick already in flight is discarded rather than published.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use pitwall_config::EngineConfig;
use pitwall_core::events::{SampleBus, Subscription};
use pitwall_core::time::Clock;
use pitwall_core::{ConfigurationError, Sample};

use crate::{Simulation, TickOutcome};

/// Counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub seed: u32,
    pub ticks: u64,
    pub emitted: u64,
    pub dropped: u64,
}

struct Shared {
    simulation: Mutex<Simulation>,
    bus: SampleBus,
    running: AtomicBool,
    generation: AtomicU64,
    emitted: AtomicU64,
    dropped: AtomicU64,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::Acquire) && self.generation.load(Ordering::Acquire) == generation
    }

    /// Draws the next delay unless `generation` has been superseded.
    ///
    /// The check happens under the simulation lock; `start` and `stop` bump
    /// the generation under the same lock, so a stale loop never touches a
    /// reset simulation.
    fn next_delay(&self, generation: u64) -> Option<Duration> {
        let mut simulation = self.simulation.lock();
        self.is_current(generation).then(|| simulation.next_tick_delay())
    }

    /// Runs one tick unless `generation` has been superseded.
    fn tick(&self, generation: u64, delay: Duration) -> Option<TickOutcome> {
        let mut simulation = self.simulation.lock();
        self.is_current(generation).then(|| simulation.advance(delay))
    }
}

/// Periodic sample producer for one vehicle.
pub struct TelemetryEngine {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TelemetryEngine {
    /// Builds an engine seeded from the thread-local generator.
    pub fn new(config: &EngineConfig, clock: Arc<dyn Clock>) -> Result<Self, ConfigurationError> {
        let seed = rand::rng().random::<u32>();
        info!(seed, vehicle = %config.vehicle_id, "telemetry engine created");
        Self::with_seed(config, seed, clock)
    }

    pub fn with_seed(
        config: &EngineConfig,
        seed: u32,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigurationError> {
        let simulation = Simulation::new(config, seed, clock)?;
        Ok(Self {
            shared: Arc::new(Shared {
                simulation: Mutex::new(simulation),
                bus: SampleBus::new(),
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
                emitted: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
            task: Mutex::new(None),
        })
    }

    /// Attaches a listener for every emitted sample.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Sample) + Send + Sync + 'static,
    {
        self.shared.bus.subscribe(callback)
    }

    /// Starts emitting. A no-op returning `false` while already running.
    ///
    /// The simulation state is reset; the generator is reseeded only when
    /// `seed` is given. Requires a tokio runtime on the calling thread.
    pub fn start(&self, seed: Option<u32>) -> bool {
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("start ignored, engine already running");
            return false;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                error!("cannot start telemetry engine outside a tokio runtime: {e}");
                self.shared.running.store(false, Ordering::Release);
                return false;
            }
        };

        let (seed_in_use, generation) = {
            let mut simulation = self.shared.simulation.lock();
            simulation.reset(seed);
            let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
            (simulation.seed(), generation)
        };
        info!(seed = seed_in_use, generation, "telemetry engine started");

        let shared = Arc::clone(&self.shared);
        let task = handle.spawn(drive(shared, generation));
        if let Some(previous) = self.task.lock().replace(task) {
            previous.abort();
        }
        true
    }

    /// Stops emitting. A no-op when not running.
    pub fn stop(&self) {
        {
            let _simulation = self.shared.simulation.lock();
            self.shared.generation.fetch_add(1, Ordering::AcqRel);
            if self.shared.running.swap(false, Ordering::AcqRel) {
                info!("telemetry engine stopped");
            }
        }
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> EngineStats {
        let simulation = self.shared.simulation.lock();
        EngineStats {
            seed: simulation.seed(),
            ticks: simulation.ticks(),
            emitted: self.shared.emitted.load(Ordering::Relaxed),
            dropped: self.shared.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Drop for TelemetryEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive(shared: Arc<Shared>, generation: u64) {
    while let Some(delay) = shared.next_delay(generation) {
        sleep(delay).await;
        let Some(outcome) = shared.tick(generation, delay) else {
            break;
        };
        match outcome {
            TickOutcome::Emitted(sample) => {
                shared.emitted.fetch_add(1, Ordering::Relaxed);
                shared.bus.publish(&sample);
            }
            TickOutcome::Dropped(error) => {
                shared.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(%error, "tick produced an invalid sample");
            }
        }
    }
    debug!(generation, "driver loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitwall_core::time::VirtualClock;

    fn engine(seed: u32) -> TelemetryEngine {
        TelemetryEngine::with_seed(
            &EngineConfig::default(),
            seed,
            Arc::new(VirtualClock::new(0)),
        )
        .unwrap()
    }

    fn collect(engine: &TelemetryEngine) -> (Arc<Mutex<Vec<Sample>>>, Subscription) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let sub = engine.subscribe(move |s| sink.lock().push(s.clone()));
        (received, sub)
    }

    #[tokio::test(start_paused = true)]
    async fn live_stream_matches_synchronous_simulation() {
        let engine = engine(42);
        let (received, _sub) = collect(&engine);

        assert!(engine.start(Some(42)));
        sleep(Duration::from_secs(30)).await;
        engine.stop();

        let live = received.lock().clone();
        assert!(live.len() > 100, "only {} samples", live.len());

        let mut reference = Simulation::new(
            &EngineConfig::default(),
            42,
            Arc::new(VirtualClock::new(0)),
        )
        .unwrap();
        let expected = reference.run(live.len());
        assert_eq!(live, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_a_no_op() {
        let engine = engine(1);
        assert!(engine.start(None));
        assert!(!engine.start(Some(5)));
        assert!(engine.is_running());
        assert_eq!(engine.stats().seed, 1);
        engine.stop();
        assert!(!engine.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_emission() {
        let engine = engine(3);
        let (received, _sub) = collect(&engine);
        engine.start(None);
        sleep(Duration::from_secs(5)).await;
        engine.stop();
        let count = received.lock().len();
        assert!(count > 0);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(received.lock().len(), count);
        assert_eq!(engine.stats().emitted, count as u64);
    }

    #[tokio::test(start_paused = true)]
    async fn unsubscribed_listener_receives_nothing_more() {
        let engine = engine(8);
        let (received, sub) = collect(&engine);
        engine.start(None);
        sleep(Duration::from_secs(2)).await;
        sub.unsubscribe();
        let count = received.lock().len();
        sleep(Duration::from_secs(2)).await;
        assert_eq!(received.lock().len(), count);
        engine.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_with_seed_replays_from_the_start() {
        let engine = engine(11);
        let (received, _sub) = collect(&engine);

        engine.start(Some(11));
        sleep(Duration::from_secs(3)).await;
        engine.stop();
        let first: Vec<f64> = received.lock().iter().map(|s| s.speed_kph).collect();
        received.lock().clear();

        engine.start(Some(11));
        sleep(Duration::from_secs(3)).await;
        engine.stop();
        let second: Vec<f64> = received.lock().iter().map(|s| s.speed_kph).collect();

        let n = first.len().min(second.len());
        assert!(n > 5);
        assert_eq!(first[..n], second[..n]);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_loop_cannot_touch_a_restarted_simulation() {
        let engine = engine(5);
        let (received, _sub) = collect(&engine);

        engine.start(Some(5));
        let stale = engine.shared.generation.load(Ordering::Acquire);
        engine.stop();
        engine.start(Some(5));

        // A loop still holding the old generation gets nothing and draws nothing.
        assert!(engine.shared.next_delay(stale).is_none());
        assert!(engine
            .shared
            .tick(stale, Duration::from_millis(150))
            .is_none());
        assert_eq!(engine.stats().ticks, 0);

        sleep(Duration::from_secs(5)).await;
        engine.stop();
        let live = received.lock().clone();
        assert!(!live.is_empty());

        let mut reference = Simulation::new(
            &EngineConfig::default(),
            5,
            Arc::new(VirtualClock::new(0)),
        )
        .unwrap();
        let expected = reference.run(live.len());
        let speeds = |v: &[Sample]| v.iter().map(|s| s.speed_kph.to_bits()).collect::<Vec<_>>();
        assert_eq!(speeds(&live), speeds(&expected));
    }

    #[test]
    fn start_without_runtime_fails() {
        let engine = engine(2);
        assert!(!engine.start(None));
        assert!(!engine.is_running());
    }
}

#[macro_use]
extern crate criterion;

use std::sync::Arc;

use criterion::{black_box, Criterion};
use pitwall_config::EngineConfig;
use pitwall_core::time::VirtualClock;
use pitwall_simulator::Simulation;

/// Measures tick throughput of the synchronous simulation.
fn benchmark_tick_throughput(c: &mut Criterion) {
    let ticks = 10_000;
    let seed = 42;
    let config = EngineConfig::default();

    c.bench_function("simulation_ticks", |b| {
        b.iter(|| {
            let mut simulation =
                Simulation::new(&config, seed, Arc::new(VirtualClock::new(0))).unwrap();
            black_box(simulation.run(ticks));
        })
    });
}

criterion_group!(benches, benchmark_tick_throughput);
criterion_main!(benches);

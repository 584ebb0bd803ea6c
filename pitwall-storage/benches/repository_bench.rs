#[macro_use]
extern crate criterion;

use std::sync::Arc;

use criterion::{black_box, Criterion};
use pitwall_config::EngineConfig;
use pitwall_core::time::VirtualClock;
use pitwall_simulator::Simulation;
use pitwall_storage::{QueryParams, Repository};

fn bench_repository(c: &mut Criterion) {
    let mut simulation =
        Simulation::new(&EngineConfig::default(), 42, Arc::new(VirtualClock::new(0))).unwrap();
    let samples = simulation.run(30_000);

    let mut group = c.benchmark_group("repository");
    group.throughput(criterion::Throughput::Elements(samples.len() as u64));
    group.bench_function("add_with_eviction", |b| {
        b.iter(|| {
            let repo = Repository::default();
            for sample in &samples {
                black_box(repo.add(sample.clone()));
            }
        })
    });

    let repo = Repository::default();
    for sample in &samples {
        repo.add(sample.clone());
    }
    group.bench_function("query_page_500", |b| {
        b.iter(|| black_box(repo.query(&QueryParams::with_limit(500)).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_repository);
criterion_main!(benches);

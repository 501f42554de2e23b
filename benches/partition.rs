//! Benchmarks for the parallel work distributor.
//!
//! Partitioning is pure arithmetic; the thread strategy benchmark measures
//! the fixed cost of setting up a pool and fanning out a short work list.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fleetsync::parallel::{partition, worker_count, Distributor, Strategy};
use std::time::Duration;

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");

    for len in [10usize, 1_000, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter(|| {
                let workers = worker_count(black_box(len), 16, Duration::ZERO);
                partition(len, workers)
            })
        });
    }

    group.finish();
}

fn bench_threads_run(c: &mut Criterion) {
    let work: Vec<u64> = (0..256).collect();
    let distributor = Distributor::new(8).with_strategy(Strategy::Threads);

    c.bench_function("threads_run_256", |b| {
        b.iter(|| {
            distributor
                .run(&work, |item| {
                    black_box(item.wrapping_mul(31));
                })
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_partition, bench_threads_run);
criterion_main!(benches);

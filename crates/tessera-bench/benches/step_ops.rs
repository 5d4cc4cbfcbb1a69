//! Criterion micro-benchmarks for generation stepping.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tessera_bench::{profile, reference_profile, small_profile};
use tessera_engine::EngineConfig;

/// Benchmark: first generation on 500×500, which scans every cell.
fn bench_full_scan(c: &mut Criterion) {
    c.bench_function("step_full_scan_500", |b| {
        b.iter_batched(
            || reference_profile(42).unwrap(),
            |mut engine| black_box(engine.step().unwrap()),
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: a settled generation on 500×500, after the soup has burned in.
fn bench_incremental(c: &mut Criterion) {
    let mut engine = reference_profile(42).unwrap();
    for _ in 0..200 {
        engine.step().unwrap();
    }
    c.bench_function("step_incremental_500", |b| {
        b.iter(|| black_box(engine.step().unwrap().len()));
    });
}

/// Benchmark: the same 128×128 first generation serially and on the pool.
fn bench_serial_vs_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_scan_128");
    for (label, threshold) in [("serial", usize::MAX), ("pool", 0)] {
        group.bench_function(label, |b| {
            b.iter_batched(
                || {
                    profile(
                        EngineConfig {
                            dimension: 128,
                            serial_threshold: threshold,
                            ..EngineConfig::default()
                        },
                        7,
                    )
                    .unwrap()
                },
                |mut engine| black_box(engine.step().unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

/// Benchmark: 10 consecutive generations on 128×128.
fn bench_ten_generations(c: &mut Criterion) {
    c.bench_function("ten_generations_128", |b| {
        b.iter_batched(
            || small_profile(3).unwrap(),
            |mut engine| {
                for _ in 0..10 {
                    black_box(engine.step().unwrap());
                }
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_full_scan,
    bench_incremental,
    bench_serial_vs_pool,
    bench_ten_generations
);
criterion_main!(benches);

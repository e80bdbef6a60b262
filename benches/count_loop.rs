//! Benchmark for the raw counting loop.
//!
//! Measures a fixed number of black_box-guarded counter increments, the
//! same spin the cycle runner times against the wall clock. Useful for
//! sanity-checking how much of a one-second cycle count is loop overhead
//! versus sampling overhead.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_count_loop(c: &mut Criterion) {
    c.bench_function("count_100k", |b| {
        b.iter(|| {
            let mut iterations: u64 = 0;
            let mut i: u64 = 0;
            while i < 100_000 {
                iterations = i + 1;
                i = black_box(i) + 1;
            }
            black_box(iterations)
        });
    });
}

fn bench_count_loop_with_sampling(c: &mut Criterion) {
    c.bench_function("count_100k_sampled", |b| {
        b.iter(|| {
            let mut iterations: u64 = 0;
            let mut i: u64 = 0;
            let mut samples = 0u32;
            while i < 100_000 {
                iterations = i + 1;
                if i % 10_000 == 0 {
                    samples += black_box(1);
                }
                i = black_box(i) + 1;
            }
            black_box((iterations, samples))
        });
    });
}

criterion_group!(benches, bench_count_loop, bench_count_loop_with_sampling);
criterion_main!(benches);

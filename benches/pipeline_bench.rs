//! Criterion benchmarks for the PHATE pipeline stages.
//!
//! Run with:
//! ```bash
//! cargo bench --bench pipeline_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use phate::internals::algorithms::kernel::{build_kernel, KernelParams};
use phate::internals::algorithms::operator::diffusion_operator;
use phate::internals::algorithms::potential::diffusion_potential;
use phate::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ── helpers ──────────────────────────────────────────────────────────────────

fn two_blobs(n: usize, p: usize) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    Array2::from_shape_fn((n, p), |(i, _)| {
        (if i < n / 2 { 0.0 } else { 10.0 }) + rng.gen_range(-1.0..1.0)
    })
}

fn estimator() -> Phate<f64> {
    Phate::builder()
        .verbose(false)
        .random_state(0)
        .build()
        .unwrap()
}

// ── graph stages ─────────────────────────────────────────────────────────────

fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/kernel");
    let params = KernelParams::default();

    for &n in &[100usize, 250, 500] {
        let x = two_blobs(n, 20);
        group.bench_with_input(BenchmarkId::from_parameter(n), &x, |b, x| {
            b.iter(|| build_kernel(black_box(x.view()), &params).unwrap())
        });
    }

    group.finish();
}

fn bench_potential(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/potential");
    let x = two_blobs(250, 20);
    let kernel = build_kernel(x.view(), &KernelParams::default()).unwrap();
    let operator = diffusion_operator(kernel.view()).unwrap();

    for &t in &[1usize, 10, 30, 100] {
        group.bench_with_input(BenchmarkId::new("t", t), &t, |b, &t| {
            b.iter(|| diffusion_potential(black_box(operator.view()), t).unwrap())
        });
    }

    group.finish();
}

// ── estimator ────────────────────────────────────────────────────────────────

fn bench_fit_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline/fit_transform");
    group.sample_size(10);

    for mds in [MdsMethod::Classic, MdsMethod::Metric] {
        let x = two_blobs(200, 20);
        group.bench_with_input(BenchmarkId::from_parameter(mds), &x, |b, x| {
            b.iter(|| {
                let mut phate = Phate::builder()
                    .verbose(false)
                    .random_state(0)
                    .mds(mds)
                    .build()
                    .unwrap();
                phate.fit_transform(x, None).unwrap().sum()
            })
        });
    }

    group.finish();
}

/// Changing `t` on a fitted estimator reuses the graph.
fn bench_cached_transform(c: &mut Criterion) {
    let x = two_blobs(200, 20);
    let mut phate = estimator();
    phate.fit(&x).unwrap();

    c.bench_function("pipeline/transform_cached_graph", |b| {
        let mut t = 10;
        b.iter(|| {
            t = if t == 10 { 20 } else { 10 };
            phate.transform(Some(t)).unwrap().sum()
        })
    });
}

fn bench_entropy(c: &mut Criterion) {
    let x = two_blobs(200, 20);
    let mut phate = estimator();
    phate.fit(&x).unwrap();

    c.bench_function("pipeline/von_neumann_entropy", |b| {
        b.iter(|| phate.von_neumann_entropy(black_box(100)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_kernel,
    bench_potential,
    bench_fit_transform,
    bench_cached_transform,
    bench_entropy
);
criterion_main!(benches);

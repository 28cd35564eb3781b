//! Integration tests for the graph stages: kernel, operator and potential.

use ndarray::{array, Array2};
use phate::internals::algorithms::kernel::{build_kernel, KernelParams};
use phate::internals::algorithms::operator::diffusion_operator;
use phate::internals::algorithms::potential::diffusion_potential;
use phate::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_data(n: usize, p: usize, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((n, p), |_| rng.gen_range(-3.0..3.0))
}

fn params(a: f64, k: usize, knn_dist: DistanceMetric) -> KernelParams<f64> {
    KernelParams { a, k, knn_dist }
}

#[test]
fn kernels_are_symmetric_and_non_negative_for_every_metric() {
    let x = random_data(25, 5, 1);
    for metric in [
        DistanceMetric::Euclidean,
        DistanceMetric::SqEuclidean,
        DistanceMetric::Cityblock,
        DistanceMetric::Chebyshev,
        DistanceMetric::Cosine,
        DistanceMetric::Correlation,
        DistanceMetric::Canberra,
        DistanceMetric::BrayCurtis,
    ] {
        for a in [1.0, 2.0, 10.0] {
            let kernel = build_kernel(x.view(), &params(a, 5, metric)).unwrap();
            assert_eq!(kernel, kernel.t(), "{} a={}", metric, a);
            assert!(kernel.iter().all(|&v| v >= 0.0 && v.is_finite()));
        }
    }
}

#[test]
fn operator_rows_sum_to_one() {
    for seed in 0..5 {
        let x = random_data(40, 3, seed);
        let kernel = build_kernel(x.view(), &params(10.0, 5, DistanceMetric::Euclidean)).unwrap();
        let operator = diffusion_operator(kernel.view()).unwrap();
        for row in operator.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }
}

#[test]
fn zero_row_kernel_is_degenerate() {
    let kernel: Array2<f64> = array![[1.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
    assert_eq!(
        diffusion_operator(kernel.view()),
        Err(PhateError::DegenerateKernel { row: 2 })
    );
}

/// Two far-apart groups give an operator with exact zeros between them;
/// the potential must still be finite everywhere.
#[test]
fn potential_is_finite_for_disconnected_graphs() {
    let mut x = random_data(20, 2, 9);
    for mut row in x.rows_mut().into_iter().skip(10) {
        row += 1e6;
    }
    let kernel = build_kernel(x.view(), &params(10.0, 3, DistanceMetric::Euclidean)).unwrap();
    let operator = diffusion_operator(kernel.view()).unwrap();
    assert_eq!(operator[[0, 15]], 0.0);

    for t in [1, 2, 30, 100] {
        let potential = diffusion_potential(operator.view(), t).unwrap();
        assert!(potential.iter().all(|v| v.is_finite()));
        assert!(potential.iter().all(|&v| v >= 0.0));
    }
}

#[test]
fn larger_bandwidth_index_spreads_affinity() {
    let x = random_data(30, 3, 4);
    let narrow = build_kernel(x.view(), &params(10.0, 2, DistanceMetric::Euclidean)).unwrap();
    let wide = build_kernel(x.view(), &params(10.0, 10, DistanceMetric::Euclidean)).unwrap();
    assert!(wide.sum() > narrow.sum());
}

#[test]
fn exact_duplicates_at_k_are_rejected() {
    let mut x = random_data(10, 3, 5);
    let first = x.row(0).to_owned();
    x.row_mut(1).assign(&first);
    x.row_mut(2).assign(&first);
    assert!(matches!(
        build_kernel(x.view(), &params(10.0, 3, DistanceMetric::Euclidean)),
        Err(PhateError::DuplicateData { k: 3, .. })
    ));
}

/// A tight cluster stays valid when another cluster sits very far away.
#[test]
fn dense_cluster_next_to_distant_cluster_is_accepted() {
    let mut x = Array2::<f64>::zeros((9, 2));
    for i in 0..6 {
        x[[i, 0]] = i as f64 * 0.01;
        x[[i, 1]] = (i % 2) as f64 * 0.005;
    }
    x[[6, 0]] = 1e7;
    x[[7, 0]] = 1e7 + 1.0;
    x[[8, 0]] = 1e7 + 2.5;

    let kernel = build_kernel(x.view(), &params(10.0, 2, DistanceMetric::Euclidean)).unwrap();
    assert!(kernel.iter().all(|v| v.is_finite() && *v >= 0.0));
    assert!(kernel[[0, 1]] > 0.0);
    assert_eq!(kernel[[0, 6]], 0.0);
}

//! Integration tests for the Von Neumann entropy diagnostic.

use approx::assert_abs_diff_eq;
use ndarray::Array2;
use phate::internals::evaluation::entropy::von_neumann_entropy;
use phate::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn assert_non_increasing(values: &[f64]) {
    for (t, w) in values.windows(2).enumerate() {
        assert!(
            w[1] <= w[0] + 1e-9,
            "entropy increased between t={} and t={}: {} -> {}",
            t + 1,
            t + 2,
            w[0],
            w[1]
        );
    }
}

/// An identity affinity has a flat spectrum, so powering never concentrates
/// it: the curve is constant at `ln(n)` and in particular non-increasing.
#[test]
fn identity_kernel_gives_non_increasing_curve() {
    let kernel = Array2::<f64>::eye(8);
    let curve = von_neumann_entropy(kernel.view(), 10).unwrap();
    assert_eq!(curve.len(), 10);
    assert_non_increasing(&curve.values);
    for (_, h) in curve.iter() {
        assert_abs_diff_eq!(h, 8.0_f64.ln(), epsilon = 1e-9);
    }
}

#[test]
fn fitted_kernel_entropy_decays_and_leaves_caches_alone() {
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    let x = Array2::from_shape_fn((30, 4), |(i, _)| {
        (if i < 15 { 0.0 } else { 4.0 }) + rng.gen_range(-1.0..1.0)
    });
    let mut phate = Phate::<f64>::builder()
        .verbose(false)
        .k(4)
        .t(5)
        .build()
        .unwrap();
    phate.fit_transform(&x, None).unwrap();
    let before = phate.stats();

    let curve = phate.von_neumann_entropy(20).unwrap();
    assert_eq!(curve.len(), 20);
    assert_non_increasing(&curve.values);
    let upper = 30.0_f64.ln();
    assert!(curve.iter().all(|(_, h)| (0.0..=upper + 1e-12).contains(&h)));
    assert!(curve.at(20).unwrap() < curve.at(1).unwrap());

    assert_eq!(phate.stats(), before);
    assert!(phate.embedding().is_some());
}

#[test]
fn non_square_kernel_is_rejected() {
    let kernel = Array2::<f64>::zeros((3, 4));
    assert!(matches!(
        von_neumann_entropy(kernel.view(), 5),
        Err(PhateError::ShapeMismatch { .. })
    ));
}

//! SMACOF stress majorisation for metric and non-metric MDS.
//!
//! ## Purpose
//!
//! Iteratively refines a configuration so that its Euclidean distances match
//! target disparities, minimising raw stress `½ Σ (d_ij(X) - δ_ij)²` through
//! Guttman transforms `X ← (1/n) B(X) X`.
//!
//! ## Design notes
//!
//! * Metric MDS uses the dissimilarities directly as disparities.
//! * Non-metric MDS replaces them each iteration by the isotonic (monotone)
//!   regression of the current distances on the dissimilarity ranks, rescaled
//!   so that `Σ_{i<j} δ_ij² = n(n-1)/2`. Pairs with zero dissimilarity keep
//!   their current distance.
//! * Convergence is declared when the normalised stress improves by less
//!   than `eps` between iterations.
//! * Zero distances are clamped to `1e-5` inside the Guttman ratio.
//!
//! ## Invariants
//!
//! * Dissimilarities are symmetric with a zero diagonal.
//! * The returned configuration has the same shape as the initial one.

use core::cmp::Ordering;

use ndarray::{Array2, ArrayView2};

use crate::math::distance::{pairwise_distances, DistanceMetric};

const MIN_DISTANCE: f64 = 1e-5;

/// SMACOF run configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmacofParams {
    /// Metric (`true`) or non-metric (`false`) stress.
    pub metric: bool,

    /// Iteration budget.
    pub max_iter: usize,

    /// Relative stress improvement below which iteration stops.
    pub eps: f64,
}

/// Outcome of one SMACOF run.
#[derive(Debug, Clone)]
pub struct SmacofOutput {
    /// Final configuration.
    pub embedding: Array2<f64>,

    /// Raw stress of the final configuration.
    pub stress: f64,

    /// Iterations performed.
    pub iterations: usize,
}

/// Run SMACOF from `init` against `dissimilarities`.
pub fn smacof(
    dissimilarities: ArrayView2<'_, f64>,
    init: Array2<f64>,
    params: &SmacofParams,
) -> SmacofOutput {
    let n = dissimilarities.nrows();
    let mut x = init;
    let mut stress = 0.0;
    let mut old_stress: Option<f64> = None;
    let mut iterations = 0;

    if n < 2 {
        return SmacofOutput {
            embedding: x,
            stress,
            iterations,
        };
    }

    let pairs = upper_pairs_by_dissimilarity(dissimilarities);

    for it in 0..params.max_iter {
        iterations = it + 1;
        let dis = pairwise_distances(x.view(), DistanceMetric::Euclidean);

        let disparities = if params.metric {
            dissimilarities.to_owned()
        } else {
            nonmetric_disparities(&dis, &pairs)
        };

        stress = dis
            .iter()
            .zip(disparities.iter())
            .map(|(d, h)| (d - h) * (d - h))
            .sum::<f64>()
            / 2.0;

        x = guttman_transform(&dis, &disparities, &x);

        let norm: f64 = x
            .rows()
            .into_iter()
            .map(|r| r.iter().map(|v| v * v).sum::<f64>().sqrt())
            .sum();
        let scaled = if norm > 0.0 { stress / norm } else { stress };
        if let Some(prev) = old_stress {
            if prev - scaled < params.eps {
                break;
            }
        }
        old_stress = Some(scaled);
    }

    SmacofOutput {
        embedding: x,
        stress,
        iterations,
    }
}

/// `X ← (1/n) B X` with `B = -δ/d` off the diagonal and row sums on it.
fn guttman_transform(dis: &Array2<f64>, disparities: &Array2<f64>, x: &Array2<f64>) -> Array2<f64> {
    let n = dis.nrows();
    let mut b = Array2::zeros((n, n));
    for i in 0..n {
        let mut row_sum = 0.0;
        for j in 0..n {
            let d = if dis[[i, j]] == 0.0 { MIN_DISTANCE } else { dis[[i, j]] };
            let ratio = disparities[[i, j]] / d;
            b[[i, j]] = -ratio;
            row_sum += ratio;
        }
        b[[i, i]] += row_sum;
    }
    b.dot(x) / n as f64
}

/// Upper-triangle pairs with non-zero dissimilarity, sorted ascending.
fn upper_pairs_by_dissimilarity(dissimilarities: ArrayView2<'_, f64>) -> Vec<(usize, usize)> {
    let n = dissimilarities.nrows();
    let mut pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .filter(|&(i, j)| dissimilarities[[i, j]] != 0.0)
        .collect();
    pairs.sort_by(|&(a, b), &(c, d)| {
        dissimilarities[[a, b]]
            .partial_cmp(&dissimilarities[[c, d]])
            .unwrap_or(Ordering::Equal)
    });
    pairs
}

/// Kruskal disparities: monotone fit of current distances, rescaled.
fn nonmetric_disparities(dis: &Array2<f64>, pairs: &[(usize, usize)]) -> Array2<f64> {
    let n = dis.nrows();
    let targets: Vec<f64> = pairs.iter().map(|&(i, j)| dis[[i, j]]).collect();
    let fitted = isotonic_regression(&targets);

    let mut disparities = dis.clone();
    for (&(i, j), &v) in pairs.iter().zip(fitted.iter()) {
        disparities[[i, j]] = v;
        disparities[[j, i]] = v;
    }

    let upper_sq: f64 = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .map(|(i, j)| disparities[[i, j]] * disparities[[i, j]])
        .sum();
    if upper_sq > 0.0 {
        let target = (n * (n - 1)) as f64 / 2.0;
        disparities.mapv_inplace(|v| v * (target / upper_sq).sqrt());
    }
    disparities
}

/// Pool-adjacent-violators fit of a non-decreasing sequence to `y`.
pub(crate) fn isotonic_regression(y: &[f64]) -> Vec<f64> {
    // blocks of (mean, weight)
    let mut blocks: Vec<(f64, usize)> = Vec::with_capacity(y.len());
    for &v in y {
        blocks.push((v, 1));
        while blocks.len() > 1 {
            let (m2, w2) = blocks[blocks.len() - 1];
            let (m1, w1) = blocks[blocks.len() - 2];
            if m1 <= m2 {
                break;
            }
            blocks.truncate(blocks.len() - 2);
            let w = w1 + w2;
            blocks.push(((m1 * w1 as f64 + m2 * w2 as f64) / w as f64, w));
        }
    }

    let mut out = Vec::with_capacity(y.len());
    for (m, w) in blocks {
        out.extend(std::iter::repeat(m).take(w));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn pav_pools_violations() {
        let fit = isotonic_regression(&[1.0, 3.0, 2.0, 4.0, 0.0]);
        for w in fit.windows(2) {
            assert!(w[0] <= w[1] + 1e-12);
        }
        assert_abs_diff_eq!(fit.iter().sum::<f64>(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn pav_keeps_sorted_input() {
        let y = [0.5, 1.0, 1.0, 2.0];
        assert_eq!(isotonic_regression(&y), y.to_vec());
    }

    #[test]
    fn metric_smacof_reduces_stress() {
        let points: Array2<f64> = array![[0.0, 0.0], [2.0, 0.0], [0.0, 1.0], [2.0, 1.0], [1.0, 3.0]];
        let d = pairwise_distances(points.view(), DistanceMetric::Euclidean);
        let init: Array2<f64> = array![[0.1, 0.2], [0.3, 0.1], [0.9, 0.8], [0.4, 0.6], [0.5, 0.5]];
        let params = SmacofParams { metric: true, max_iter: 500, eps: 1e-9 };

        let first = smacof(d.view(), init.clone(), &SmacofParams { max_iter: 1, ..params });
        let out = smacof(d.view(), init, &params);
        assert!(out.stress <= first.stress);
    }

    #[test]
    fn classical_start_is_already_optimal_for_planar_data() {
        let points: Array2<f64> = array![[0.0, 0.0], [2.0, 0.0], [0.0, 1.0], [2.0, 1.0], [1.0, 3.0]];
        let d = pairwise_distances(points.view(), DistanceMetric::Euclidean);
        let init = crate::embedding::classic::classical_mds(d.view(), 2);
        let params = SmacofParams { metric: true, max_iter: 100, eps: 1e-9 };
        let out = smacof(d.view(), init, &params);
        assert!(out.stress < 1e-8);
    }

    #[test]
    fn nonmetric_smacof_runs_and_stays_finite() {
        let points: Array2<f64> = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [3.0, 3.0]];
        let d = pairwise_distances(points.view(), DistanceMetric::Euclidean);
        let params = SmacofParams { metric: false, max_iter: 300, eps: 1e-6 };
        let out = smacof(d.view(), points.clone(), &params);
        assert_eq!(out.embedding.dim(), (5, 2));
        assert!(out.embedding.iter().all(|v| v.is_finite()));
    }
}

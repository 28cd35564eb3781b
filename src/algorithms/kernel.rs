//! Adaptive-bandwidth affinity kernel.
//!
//! ## Purpose
//!
//! This module builds the symmetric affinity matrix that seeds the diffusion
//! process. Each point gets its own bandwidth, the distance to its k-th
//! nearest neighbour, so dense regions are resolved finely and sparse regions
//! still connect.
//!
//! ## Design notes
//!
//! * Bandwidths come from an O(n) partial selection per row
//!   (`select_nth_unstable_by`), not a full sort.
//! * Row `i` of the distance matrix is divided by `ε(i)` and passed through
//!   `exp(-(d/ε)^a)`. The result is then symmetrised additively, `K + Kᵀ`.
//!   The two steps are a matched pair: the row-wise rescaling is only
//!   symmetric once the transpose is added back.
//! * The sum is not halved. The downstream row normalisation consumes the
//!   doubled scale, and diffusion-time semantics depend on it.
//!
//! ## Key concepts
//!
//! ### Decay exponent
//!
//! `a` controls how sharply affinity falls off past one bandwidth. `a = 2` is
//! a Gaussian; the default `a = 10` is close to a hard neighbourhood cut-off
//! with smooth edges.
//!
//! ### Coincident points
//!
//! When a point coincides with enough others, its bandwidth collapses towards
//! zero and `d/ε` blows up. A row whose coincident group (itself included,
//! within `sqrt(machine epsilon) × max(ε(i), median ε)`) reaches `max(k, 2)`
//! points, or whose bandwidth is not strictly positive, is rejected with
//! [`PhateError::DuplicateData`]. The tolerance follows the local bandwidth,
//! so a far-away cluster does not swallow a dense one.
//!
//! ## Invariants
//!
//! * The returned kernel is exactly symmetric.
//! * All entries are finite and non-negative; the diagonal is exactly 2.
//!
//! ## Non-goals
//!
//! * No sparse kNN graph; the kernel is dense `n × n`.
//! * No jitter or automatic de-duplication.

use core::cmp::Ordering;

use ndarray::{Array1, Array2, ArrayView2};
use num_traits::Float;

use crate::math::distance::{pairwise_distances, DistanceMetric};
use crate::primitives::checks;
use crate::primitives::errors::PhateError;
use crate::primitives::float::PhateFloat;

// ============================================================================
// Parameters
// ============================================================================

/// Kernel-construction parameters.
///
/// Any change to these invalidates the cached kernel and everything built
/// from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelParams<T> {
    /// Decay exponent of the kernel tails.
    pub a: T,

    /// Neighbour index used as the adaptive bandwidth.
    pub k: usize,

    /// Metric for the input-space distances.
    pub knn_dist: DistanceMetric,
}

impl<T: Float> Default for KernelParams<T> {
    fn default() -> Self {
        Self {
            a: T::from(10.0).unwrap(),
            k: 5,
            knn_dist: DistanceMetric::Euclidean,
        }
    }
}

// ============================================================================
// Bandwidths
// ============================================================================

/// Per-row adaptive bandwidth: entry `k` of each sorted distance row.
///
/// Index 0 of a sorted row is the point itself, so this is the distance to
/// the k-th nearest other point. Requires `k < n`.
pub fn adaptive_bandwidths<T: Float>(distances: ArrayView2<'_, T>, k: usize) -> Array1<T> {
    let mut scratch = Vec::with_capacity(distances.ncols());
    distances
        .rows()
        .into_iter()
        .map(|row| {
            scratch.clear();
            scratch.extend(row.iter().copied());
            let (_, kth, _) = scratch
                .select_nth_unstable_by(k, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
            *kth
        })
        .collect()
}

/// Median of the bandwidths, the typical k-th-neighbour scale of the data.
fn median_bandwidth<T: Float>(bandwidths: &Array1<T>) -> T {
    let mut sorted: Vec<T> = bandwidths.iter().copied().collect();
    if sorted.is_empty() {
        return T::zero();
    }
    let mid = sorted.len() / 2;
    let (_, median, _) =
        sorted.select_nth_unstable_by(mid, |a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    *median
}

/// Reject rows whose bandwidth is degenerate because of coincident points.
///
/// Row `i` counts points within `sqrt(machine epsilon) × max(ε(i), median ε)`.
/// The floor at the median keeps a tight group detectable even when its own
/// bandwidth has collapsed.
fn check_duplicates<T: Float>(
    distances: ArrayView2<'_, T>,
    bandwidths: &Array1<T>,
    k: usize,
) -> Result<(), PhateError> {
    let scale = median_bandwidth(bandwidths);
    let rel = T::epsilon().sqrt();
    let group_limit = k.max(2);

    for (row, (dists, &eps)) in distances.rows().into_iter().zip(bandwidths.iter()).enumerate() {
        if !(eps.is_finite() && eps > T::zero()) {
            return Err(PhateError::DuplicateData { k, row });
        }
        let tolerance = rel * eps.max(scale);
        let coincident = dists.iter().filter(|&&d| d <= tolerance).count();
        if coincident >= group_limit {
            return Err(PhateError::DuplicateData { k, row });
        }
    }
    Ok(())
}

// ============================================================================
// Kernel Construction
// ============================================================================

/// Build the `n × n` adaptive affinity kernel for `data` (`n × p`).
pub fn build_kernel<T: PhateFloat>(
    data: ArrayView2<'_, T>,
    params: &KernelParams<T>,
) -> Result<Array2<T>, PhateError> {
    let n = data.nrows();
    checks::check_decay(params.a)?;
    checks::check_neighbors(params.k, n)?;

    let distances = pairwise_distances(data, params.knn_dist);
    let bandwidths = adaptive_bandwidths(distances.view(), params.k);
    check_duplicates(distances.view(), &bandwidths, params.k)?;

    // Row i is tuned by its own bandwidth.
    let mut tuned = distances;
    for (mut row, &eps) in tuned.rows_mut().into_iter().zip(bandwidths.iter()) {
        row.mapv_inplace(|d| (-(d / eps).powf(params.a)).exp());
    }

    let kernel = &tuned + &tuned.t();
    if let Some(((row, _), _)) = kernel.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(PhateError::DuplicateData { k: params.k, row });
    }
    Ok(kernel)
}

//! Distance metrics and pairwise distance matrices.
//!
//! ## Purpose
//!
//! This module provides the closed set of distance metrics used for both the
//! kNN bandwidth graph (`knn_dist`) and the MDS stage (`mds_dist`), and the
//! dense pairwise distance matrix built from them.
//!
//! ## Design notes
//!
//! * Metrics are a tagged enum, not strings: names are parsed once via
//!   [`FromStr`] and unknown names fail before any numeric work.
//! * Each metric maps to one concrete function over two rows.
//! * The pairwise matrix is symmetric with an exactly zero diagonal; only the
//!   upper triangle is evaluated.
//!
//! ## Key concepts
//!
//! ### Degenerate rows
//!
//! Angle-based metrics (cosine, correlation) are undefined for zero-norm rows.
//! Two zero rows are at distance 0, a zero row and a non-zero row at
//! distance 1. Ratio metrics (canberra, braycurtis) treat `0/0` terms as 0.
//!
//! ## Invariants
//!
//! * `d(x, x) = 0` and `d(x, y) = d(y, x)` for every metric.
//! * All returned distances are non-negative for finite input.

use core::fmt;
use core::str::FromStr;

use ndarray::{Array2, ArrayView1, ArrayView2};
use num_traits::Float;

use crate::primitives::errors::PhateError;

// ============================================================================
// Metric Enumeration
// ============================================================================

/// Distance metric between two observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistanceMetric {
    /// `sqrt(sum((u - v)^2))`
    #[default]
    Euclidean,

    /// `sum((u - v)^2)`
    SqEuclidean,

    /// `sum(|u - v|)` (Manhattan / L1)
    Cityblock,

    /// `max(|u - v|)`
    Chebyshev,

    /// `1 - u.v / (|u| |v|)`
    Cosine,

    /// Cosine distance of the mean-centred rows.
    Correlation,

    /// `sum(|u - v| / (|u| + |v|))`
    Canberra,

    /// `sum(|u - v|) / sum(|u + v|)`
    BrayCurtis,
}

impl DistanceMetric {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::SqEuclidean => "sqeuclidean",
            DistanceMetric::Cityblock => "cityblock",
            DistanceMetric::Chebyshev => "chebyshev",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Correlation => "correlation",
            DistanceMetric::Canberra => "canberra",
            DistanceMetric::BrayCurtis => "braycurtis",
        }
    }

    /// Distance between two rows of equal length.
    pub fn distance<T: Float>(self, u: ArrayView1<'_, T>, v: ArrayView1<'_, T>) -> T {
        match self {
            DistanceMetric::Euclidean => sq_euclidean(u, v).sqrt(),
            DistanceMetric::SqEuclidean => sq_euclidean(u, v),
            DistanceMetric::Cityblock => u
                .iter()
                .zip(v.iter())
                .fold(T::zero(), |acc, (&a, &b)| acc + (a - b).abs()),
            DistanceMetric::Chebyshev => u
                .iter()
                .zip(v.iter())
                .fold(T::zero(), |acc, (&a, &b)| acc.max((a - b).abs())),
            DistanceMetric::Cosine => angular(u, v, T::zero(), T::zero()),
            DistanceMetric::Correlation => {
                let mu = mean(u);
                let mv = mean(v);
                angular(u, v, mu, mv)
            }
            DistanceMetric::Canberra => u.iter().zip(v.iter()).fold(T::zero(), |acc, (&a, &b)| {
                let denom = a.abs() + b.abs();
                if denom > T::zero() {
                    acc + (a - b).abs() / denom
                } else {
                    acc
                }
            }),
            DistanceMetric::BrayCurtis => {
                let (num, denom) = u
                    .iter()
                    .zip(v.iter())
                    .fold((T::zero(), T::zero()), |(n, d), (&a, &b)| {
                        (n + (a - b).abs(), d + (a + b).abs())
                    });
                if denom > T::zero() {
                    num / denom
                } else {
                    T::zero()
                }
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = PhateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "sqeuclidean" => Ok(DistanceMetric::SqEuclidean),
            "cityblock" | "manhattan" | "l1" => Ok(DistanceMetric::Cityblock),
            "chebyshev" | "linf" => Ok(DistanceMetric::Chebyshev),
            "cosine" => Ok(DistanceMetric::Cosine),
            "correlation" => Ok(DistanceMetric::Correlation),
            "canberra" => Ok(DistanceMetric::Canberra),
            "braycurtis" => Ok(DistanceMetric::BrayCurtis),
            _ => Err(PhateError::UnknownMetric(s.to_string())),
        }
    }
}

// ============================================================================
// Row Helpers
// ============================================================================

fn sq_euclidean<T: Float>(u: ArrayView1<'_, T>, v: ArrayView1<'_, T>) -> T {
    u.iter().zip(v.iter()).fold(T::zero(), |acc, (&a, &b)| {
        let d = a - b;
        acc + d * d
    })
}

fn mean<T: Float>(u: ArrayView1<'_, T>) -> T {
    if u.is_empty() {
        return T::zero();
    }
    let n = T::from(u.len()).unwrap_or_else(T::one);
    u.iter().fold(T::zero(), |acc, &a| acc + a) / n
}

/// `1 - cos` between `u - cu` and `v - cv`.
fn angular<T: Float>(u: ArrayView1<'_, T>, v: ArrayView1<'_, T>, cu: T, cv: T) -> T {
    let (dot, nu, nv) = u.iter().zip(v.iter()).fold(
        (T::zero(), T::zero(), T::zero()),
        |(dot, nu, nv), (&a, &b)| {
            let a = a - cu;
            let b = b - cv;
            (dot + a * b, nu + a * a, nv + b * b)
        },
    );
    let zero_u = nu <= T::zero();
    let zero_v = nv <= T::zero();
    match (zero_u, zero_v) {
        (true, true) => T::zero(),
        (true, false) | (false, true) => T::one(),
        (false, false) => {
            let cos = dot / (nu.sqrt() * nv.sqrt());
            // rounding can push |cos| a hair past 1
            (T::one() - cos).max(T::zero())
        }
    }
}

// ============================================================================
// Pairwise Matrix
// ============================================================================

/// Dense `n × n` distance matrix between the rows of `data`.
pub fn pairwise_distances<T: Float>(data: ArrayView2<'_, T>, metric: DistanceMetric) -> Array2<T> {
    let n = data.nrows();
    let mut out = Array2::zeros((n, n));
    for i in 0..n {
        let ri = data.row(i);
        for j in (i + 1)..n {
            let d = metric.distance(ri, data.row(j));
            out[[i, j]] = d;
            out[[j, i]] = d;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array1, Array2};

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("Euclidean".parse::<DistanceMetric>().unwrap(), DistanceMetric::Euclidean);
        assert_eq!("manhattan".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cityblock);
        assert_eq!("cosine".parse::<DistanceMetric>().unwrap(), DistanceMetric::Cosine);
        assert!(matches!(
            "hamming".parse::<DistanceMetric>(),
            Err(PhateError::UnknownMetric(_))
        ));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for m in [
            DistanceMetric::Euclidean,
            DistanceMetric::SqEuclidean,
            DistanceMetric::Cityblock,
            DistanceMetric::Chebyshev,
            DistanceMetric::Cosine,
            DistanceMetric::Correlation,
            DistanceMetric::Canberra,
            DistanceMetric::BrayCurtis,
        ] {
            assert_eq!(m.to_string().parse::<DistanceMetric>().unwrap(), m);
        }
    }

    #[test]
    fn known_values() {
        let u: Array1<f64> = array![0.0, 0.0];
        let v: Array1<f64> = array![3.0, 4.0];
        assert_abs_diff_eq!(DistanceMetric::Euclidean.distance(u.view(), v.view()), 5.0);
        assert_abs_diff_eq!(DistanceMetric::SqEuclidean.distance(u.view(), v.view()), 25.0);
        assert_abs_diff_eq!(DistanceMetric::Cityblock.distance(u.view(), v.view()), 7.0);
        assert_abs_diff_eq!(DistanceMetric::Chebyshev.distance(u.view(), v.view()), 4.0);

        let a: Array1<f64> = array![1.0, 0.0];
        let b: Array1<f64> = array![0.0, 1.0];
        assert_abs_diff_eq!(DistanceMetric::Cosine.distance(a.view(), b.view()), 1.0);
        assert_abs_diff_eq!(DistanceMetric::Cosine.distance(a.view(), a.view()), 0.0);
    }

    #[test]
    fn zero_rows_are_handled() {
        let z: Array1<f64> = array![0.0, 0.0];
        let v: Array1<f64> = array![1.0, 2.0];
        assert_eq!(DistanceMetric::Cosine.distance(z.view(), z.view()), 0.0);
        assert_eq!(DistanceMetric::Cosine.distance(z.view(), v.view()), 1.0);
        assert_eq!(DistanceMetric::Canberra.distance(z.view(), z.view()), 0.0);
        assert_eq!(DistanceMetric::BrayCurtis.distance(z.view(), z.view()), 0.0);
    }

    #[test]
    fn pairwise_matrix_is_symmetric_with_zero_diagonal() {
        let x: Array2<f64> = array![[0.0, 0.0], [1.0, 0.0], [0.0, 2.0]];
        let d = pairwise_distances(x.view(), DistanceMetric::Euclidean);
        for i in 0..3 {
            assert_eq!(d[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(d[[i, j]], d[[j, i]]);
            }
        }
        assert_abs_diff_eq!(d[[1, 2]], 5.0_f64.sqrt());
    }
}

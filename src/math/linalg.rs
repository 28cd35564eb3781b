//! Dense linear-algebra helpers.
//!
//! ## Purpose
//!
//! Small, exact building blocks used by the diffusion stages: integer matrix
//! powers, row sums, symmetrisation, and a bridge to `nalgebra` for the
//! spectral routines (singular values, symmetric eigendecomposition).
//!
//! ## Design notes
//!
//! * [`matrix_power`] uses binary exponentiation over dense products. Every
//!   step is a plain matrix multiplication, so the result is the exact integer
//!   power up to floating-point rounding; no spectral shortcut is taken.
//! * Spectral routines run in `f64` regardless of the element type.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::primitives::float::PhateFloat;

// ============================================================================
// Products
// ============================================================================

/// Raise a square matrix to a non-negative integer power.
///
/// `t = 0` yields the identity.
pub fn matrix_power<T: PhateFloat>(m: ArrayView2<'_, T>, t: usize) -> Array2<T> {
    let n = m.nrows();
    let mut result: Option<Array2<T>> = None;
    let mut base = m.to_owned();
    let mut exp = t;

    while exp > 0 {
        if exp & 1 == 1 {
            result = Some(match result {
                Some(acc) => acc.dot(&base),
                None => base.clone(),
            });
        }
        exp >>= 1;
        if exp > 0 {
            base = base.dot(&base);
        }
    }

    result.unwrap_or_else(|| Array2::eye(n))
}

/// Sum of each row.
pub fn row_sums<T: PhateFloat>(m: ArrayView2<'_, T>) -> Array1<T> {
    m.sum_axis(Axis(1))
}

/// Sum of each column.
pub fn column_sums<T: PhateFloat>(m: ArrayView2<'_, T>) -> Array1<T> {
    m.sum_axis(Axis(0))
}

/// `(M + Mᵀ) / 2`
pub fn symmetrize_mean<T: PhateFloat>(m: ArrayView2<'_, T>) -> Array2<T> {
    let half = T::from(0.5).unwrap();
    Array2::from_shape_fn(m.dim(), |(i, j)| (m[[i, j]] + m[[j, i]]) * half)
}

// ============================================================================
// nalgebra Bridge
// ============================================================================

/// Copy a 2-D array into an `f64` nalgebra matrix.
pub fn to_dmatrix<T: PhateFloat>(m: ArrayView2<'_, T>) -> DMatrix<f64> {
    let (rows, cols) = m.dim();
    DMatrix::from_fn(rows, cols, |i, j| m[[i, j]].to_f64().unwrap_or(f64::NAN))
}

/// Singular values of `m`, in no particular order.
pub fn singular_values<T: PhateFloat>(m: ArrayView2<'_, T>) -> Vec<f64> {
    to_dmatrix(m).singular_values().iter().copied().collect()
}

/// Eigenpairs of a symmetric matrix sorted by descending eigenvalue.
///
/// Returns the eigenvalues and a matrix whose column `c` is the eigenvector
/// of eigenvalue `c`.
pub fn symmetric_eigen_desc<T: PhateFloat>(m: ArrayView2<'_, T>) -> (Vec<f64>, DMatrix<f64>) {
    let eigen = SymmetricEigen::new(to_dmatrix(m));
    let mut order: Vec<usize> = (0..eigen.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

    let n = eigen.eigenvectors.nrows();
    let values = order.iter().map(|&c| eigen.eigenvalues[c]).collect();
    let vectors = DMatrix::from_fn(n, order.len(), |i, c| eigen.eigenvectors[(i, order[c])]);
    (values, vectors)
}

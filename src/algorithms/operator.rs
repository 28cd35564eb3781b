//! Markov-normalised diffusion operator.
//!
//! ## Purpose
//!
//! Turns the affinity kernel into a row-stochastic transition matrix, one
//! step of a random walk over the similarity graph. A caller may instead
//! supply a precomputed operator, which is passed through untouched.
//!
//! ## Invariants
//!
//! * On the normalisation path every row sums to 1 up to rounding.
//! * A row with zero (or non-finite) mass fails with
//!   [`PhateError::DegenerateKernel`] instead of producing NaN.

use ndarray::{Array2, ArrayView2, Axis};

use crate::math::linalg::row_sums;
use crate::primitives::errors::PhateError;
use crate::primitives::float::PhateFloat;

/// Where the operator handed to the diffusion stage came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorSource {
    /// Row-normalised from the affinity kernel.
    Computed,

    /// Supplied by the caller and returned unchanged.
    Precomputed,
}

/// Row-normalise `kernel` into a transition matrix.
pub fn diffusion_operator<T: PhateFloat>(kernel: ArrayView2<'_, T>) -> Result<Array2<T>, PhateError> {
    let sums = row_sums(kernel);
    if let Some(row) = sums.iter().position(|s| !(s.is_finite() && *s > T::zero())) {
        return Err(PhateError::DegenerateKernel { row });
    }

    let mut operator = kernel.to_owned();
    for (mut row, &s) in operator.axis_iter_mut(Axis(0)).zip(sums.iter()) {
        row.mapv_inplace(|v| v / s);
    }
    Ok(operator)
}

/// Produce the operator for the diffusion stage.
///
/// A precomputed operator wins and is returned as-is; otherwise the kernel is
/// normalised. With neither available the pipeline has not been fitted.
pub fn resolve_operator<T: PhateFloat>(
    kernel: Option<ArrayView2<'_, T>>,
    precomputed: Option<Array2<T>>,
) -> Result<(Array2<T>, OperatorSource), PhateError> {
    match (precomputed, kernel) {
        (Some(operator), _) => Ok((operator, OperatorSource::Precomputed)),
        (None, Some(kernel)) => Ok((diffusion_operator(kernel)?, OperatorSource::Computed)),
        (None, None) => Err(PhateError::NotFitted {
            operation: "diffusion operator",
        }),
    }
}

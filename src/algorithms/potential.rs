//! Diffusion potential.
//!
//! ## Purpose
//!
//! Raises the diffusion operator to the diffusion time `t` and applies a
//! floored negative log, turning t-step transition probabilities into a
//! distance-like potential.
//!
//! ## Design notes
//!
//! * `Pᵗ` is an exact integer matrix power (binary exponentiation over dense
//!   products), never an eigendecomposition.
//! * Every entry of `Pᵗ` that is zero or at most machine epsilon is replaced
//!   by machine epsilon before the log. Transition probabilities between
//!   disconnected components are exactly zero, and `ln(0)` would poison the
//!   embedding with infinities.
//!
//! ## Invariants
//!
//! * Every entry of the potential is finite and non-negative for a
//!   row-stochastic operator.
//! * The potential is only approximately symmetric: `Pᵗ` of a non-symmetric
//!   operator is not symmetric, and consumers must not assume it.

use ndarray::{Array2, ArrayView2};

use crate::math::linalg::matrix_power;
use crate::primitives::checks;
use crate::primitives::errors::PhateError;
use crate::primitives::float::PhateFloat;

/// `-ln(max(Pᵗ, ε))` for diffusion time `t ≥ 1`.
pub fn diffusion_potential<T: PhateFloat>(
    operator: ArrayView2<'_, T>,
    t: usize,
) -> Result<Array2<T>, PhateError> {
    checks::check_diffusion_time(t)?;

    let mut diffused = matrix_power(operator, t);
    let floor = T::epsilon();
    diffused.mapv_inplace(|p| {
        // NaN fails the comparison and is floored too
        let p = if p > floor { p } else { floor };
        -p.ln()
    });
    Ok(diffused)
}

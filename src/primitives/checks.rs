//! Parameter bound checks shared by the pipeline stages.
//!
//! ## Purpose
//!
//! Each stage function rejects out-of-range parameters itself, so the stages
//! stay safe to call directly without the estimator. The engine's
//! `Validator` builds its configuration checks on the same functions.
//!
//! ## Design notes
//!
//! * Every check is a free function returning `Result<(), PhateError>`.
//! * Generic over `Float` so `f32` and `f64` pipelines share the rules.

use ndarray::ArrayView2;
use num_traits::Float;

use crate::primitives::errors::PhateError;

// ============================================================================
// Matrices
// ============================================================================

/// Every entry of `m` is finite.
pub fn check_finite<T: Float>(m: ArrayView2<'_, T>, name: &str) -> Result<(), PhateError> {
    if let Some(((i, j), v)) = m.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(PhateError::InvalidNumericValue(format!(
            "{}[{}, {}]={}",
            name,
            i,
            j,
            v.to_f64().unwrap_or(f64::NAN)
        )));
    }
    Ok(())
}

/// `m` is square.
pub fn check_square<T>(m: ArrayView2<'_, T>, what: &'static str) -> Result<(), PhateError> {
    let (rows, cols) = m.dim();
    if rows != cols {
        return Err(PhateError::ShapeMismatch {
            what,
            expected: (rows, rows),
            got: (rows, cols),
        });
    }
    Ok(())
}

// ============================================================================
// Scalars
// ============================================================================

/// Kernel decay exponent: positive and finite.
pub fn check_decay<T: Float>(a: T) -> Result<(), PhateError> {
    if !a.is_finite() || a <= T::zero() {
        return Err(PhateError::InvalidDecay(a.to_f64().unwrap_or(f64::NAN)));
    }
    Ok(())
}

/// Neighbour index: `0 < k < n_samples`.
pub fn check_neighbors(k: usize, n_samples: usize) -> Result<(), PhateError> {
    if k == 0 {
        return Err(PhateError::ZeroNeighbors);
    }
    if k >= n_samples {
        return Err(PhateError::InvalidNeighbors { k, n_samples });
    }
    Ok(())
}

/// Diffusion time: at least 1.
pub fn check_diffusion_time(t: usize) -> Result<(), PhateError> {
    if t == 0 {
        return Err(PhateError::InvalidDiffusionTime(t));
    }
    Ok(())
}

/// Embedding dimensionality: 2 or 3.
pub fn check_components(n_components: usize) -> Result<(), PhateError> {
    if !(2..=3).contains(&n_components) {
        return Err(PhateError::InvalidComponents(n_components));
    }
    Ok(())
}

/// Entropy sweep length: at least 1.
pub fn check_entropy_horizon(t_max: usize) -> Result<(), PhateError> {
    if t_max == 0 {
        return Err(PhateError::InvalidEntropyHorizon(t_max));
    }
    Ok(())
}

/// SMACOF iteration budget: at least 1.
pub fn check_max_iter(max_iter: usize) -> Result<(), PhateError> {
    if max_iter == 0 {
        return Err(PhateError::InvalidMaxIterations(max_iter));
    }
    Ok(())
}

/// SMACOF convergence tolerance: positive and finite.
pub fn check_tolerance<T: Float>(tol: T) -> Result<(), PhateError> {
    if !tol.is_finite() || tol <= T::zero() {
        return Err(PhateError::InvalidTolerance(tol.to_f64().unwrap_or(f64::NAN)));
    }
    Ok(())
}

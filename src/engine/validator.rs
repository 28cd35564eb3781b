//! Input validation for PHATE configuration and data.
//!
//! ## Purpose
//!
//! This module checks parameters and matrices before any numeric work runs,
//! so that invalid configurations surface as a descriptive [`PhateError`]
//! instead of NaN-filled artifacts.
//!
//! ## Design notes
//!
//! * Validation is fail-fast: the first violation is returned.
//! * Cheap checks (shape, counts) run before full scans for non-finite values.
//! * Generic over `Float` so `f32` and `f64` pipelines share the rules.
//! * Parameter bounds live in `primitives::checks`, which the stages call
//!   directly; this facade adds the whole-input and builder checks.
//!
//! ## Validated parameters
//!
//! * **Input data**: non-empty, at least 2 rows, all finite
//! * **Decay `a`**: positive and finite
//! * **Neighbour index `k`**: `0 < k < n`
//! * **Diffusion time `t`**: at least 1
//! * **Components**: 2 or 3
//! * **Entropy horizon**: at least 1
//! * **Precomputed matrices**: `n × n` and finite
//! * **MDS budget**: at least one iteration, positive finite tolerance
//!
//! ## Non-goals
//!
//! * No automatic correction (clamping `k`, dropping NaN rows).
//!
//! ## Visibility
//!
//! Internal to the crate; used by the builder and the pipeline.

use ndarray::ArrayView2;
use num_traits::Float;

use crate::primitives::checks;
use crate::primitives::errors::PhateError;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for PHATE configuration and input data.
///
/// All methods are static and return `Result<(), PhateError>`.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Core Input Validation
    // ========================================================================

    /// Validate an `n × p` observation matrix.
    pub fn validate_inputs<T: Float>(data: ArrayView2<'_, T>) -> Result<(), PhateError> {
        let (n, p) = data.dim();
        if n == 0 || p == 0 {
            return Err(PhateError::EmptyInput);
        }
        if n < 2 {
            return Err(PhateError::TooFewPoints { got: n, min: 2 });
        }
        Self::validate_finite(data, "X")
    }

    /// Validate that every entry of a matrix is finite.
    pub fn validate_finite<T: Float>(m: ArrayView2<'_, T>, name: &str) -> Result<(), PhateError> {
        checks::check_finite(m, name)
    }

    /// Validate that a matrix is square.
    pub fn validate_square<T>(m: ArrayView2<'_, T>, what: &'static str) -> Result<(), PhateError> {
        checks::check_square(m, what)
    }

    /// Validate a caller-supplied kernel or operator against `n` observations.
    pub fn validate_override<T: Float>(
        m: ArrayView2<'_, T>,
        n: usize,
        what: &'static str,
    ) -> Result<(), PhateError> {
        if m.dim() != (n, n) {
            return Err(PhateError::ShapeMismatch {
                what,
                expected: (n, n),
                got: m.dim(),
            });
        }
        Self::validate_finite(m, what)
    }

    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate the kernel decay exponent.
    pub fn validate_decay<T: Float>(a: T) -> Result<(), PhateError> {
        checks::check_decay(a)
    }

    /// Validate a neighbour index before the sample count is known.
    pub fn validate_nonzero_neighbors(k: usize) -> Result<(), PhateError> {
        if k == 0 {
            return Err(PhateError::ZeroNeighbors);
        }
        Ok(())
    }

    /// Validate the neighbour index against the sample count.
    pub fn validate_neighbors(k: usize, n_samples: usize) -> Result<(), PhateError> {
        checks::check_neighbors(k, n_samples)
    }

    /// Validate the diffusion time.
    pub fn validate_diffusion_time(t: usize) -> Result<(), PhateError> {
        checks::check_diffusion_time(t)
    }

    /// Validate the embedding dimensionality.
    pub fn validate_components(n_components: usize) -> Result<(), PhateError> {
        checks::check_components(n_components)
    }

    /// Validate the SMACOF iteration budget.
    pub fn validate_max_iter(max_iter: usize) -> Result<(), PhateError> {
        checks::check_max_iter(max_iter)
    }

    /// Validate the SMACOF convergence tolerance.
    pub fn validate_tolerance<T: Float>(tol: T) -> Result<(), PhateError> {
        checks::check_tolerance(tol)
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(
        duplicate_param: Option<&'static str>,
    ) -> Result<(), PhateError> {
        if let Some(param) = duplicate_param {
            return Err(PhateError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }
}

//! Von Neumann entropy of the diffusion affinities.
//!
//! ## Purpose
//!
//! This module provides a diagnostic for choosing the diffusion time `t`. It
//! tracks how the spectral entropy of the degree-weighted affinity matrix
//! decays as the spectrum is raised to increasing powers. A good `t` sits
//! around the knee of the resulting curve, where noise dimensions have
//! collapsed but structure has not yet been diffused away.
//!
//! ## Design notes
//!
//! * Consumes only the affinity kernel; it neither reads nor mutates the
//!   operator, potential or embedding.
//! * The spectrum is computed once. Step `t` reuses the running product
//!   `σᵗ = σᵗ⁻¹ · σ` instead of decomposing a matrix power. The product is
//!   rescaled by its peak after every step, which leaves the normalised
//!   distribution unchanged.
//! * Recomputed on every call; the curve is never cached.
//!
//! ## Key concepts
//!
//! ### Degree-weighted affinity
//!
//! With `D = diag(colsum(K)^½)`, the matrix `A = D·K·D` is averaged with its
//! transpose to remove floating-point asymmetry before taking singular values.
//!
//! ### Spectral entropy
//!
//! At each step the powered singular values are normalised into a
//! probability distribution (non-positive entries dropped first) and the
//! Shannon entropy `-Σ p·ln(p)` is recorded.
//!
//! ## Invariants
//!
//! * The curve has exactly `t_max` entries, for `t = 1..=t_max`.
//! * Every entry lies in `[0, ln(n)]`.

use core::fmt;

use ndarray::{Array2, ArrayView2};

use crate::math::entropy::shannon_entropy;
use crate::math::linalg::{column_sums, singular_values, symmetrize_mean};
use crate::primitives::checks;
use crate::primitives::errors::PhateError;
use crate::primitives::float::PhateFloat;

// ============================================================================
// Result Structure
// ============================================================================

/// Von Neumann entropy at diffusion times `1..=t_max`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntropyCurve<T> {
    /// `values[i]` is the entropy at diffusion time `i + 1`.
    pub values: Vec<T>,
}

impl<T: PhateFloat> EntropyCurve<T> {
    /// Number of diffusion times evaluated.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if no diffusion time was evaluated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entropy at diffusion time `t` (1-based).
    pub fn at(&self, t: usize) -> Option<T> {
        t.checked_sub(1).and_then(|i| self.values.get(i)).copied()
    }

    /// Iterate over `(t, entropy)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, T)> + '_ {
        self.values.iter().enumerate().map(|(i, &v)| (i + 1, v))
    }
}

impl<T: PhateFloat> fmt::Display for EntropyCurve<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Von Neumann entropy:")?;
        writeln!(f, "  Diffusion times: {}", self.len())?;
        writeln!(f)?;
        writeln!(f, "{:>8} {:>14}", "t", "Entropy")?;
        writeln!(f, "{:-<23}", "")?;
        for (t, v) in self.iter() {
            writeln!(f, "{:>8} {:>14.6}", t, v)?;
        }
        Ok(())
    }
}

// ============================================================================
// Computation
// ============================================================================

/// Degree-weighted, symmetrised affinity `sym(D·K·D)`.
fn diffusion_affinity<T: PhateFloat>(kernel: ArrayView2<'_, T>) -> Result<Array2<T>, PhateError> {
    let degrees = column_sums(kernel);
    if let Some(col) = degrees.iter().position(|d| !(d.is_finite() && *d >= T::zero())) {
        return Err(PhateError::DegenerateKernel { row: col });
    }
    let scale = degrees.mapv(|d| d.sqrt());

    let weighted = Array2::from_shape_fn(kernel.dim(), |(i, j)| {
        scale[i] * kernel[[i, j]] * scale[j]
    });
    Ok(symmetrize_mean(weighted.view()))
}

/// Entropy of the affinity spectrum for `t = 1..=t_max`.
pub fn von_neumann_entropy<T: PhateFloat>(
    kernel: ArrayView2<'_, T>,
    t_max: usize,
) -> Result<EntropyCurve<T>, PhateError> {
    checks::check_entropy_horizon(t_max)?;
    checks::check_square(kernel, "affinity kernel")?;

    let affinity = diffusion_affinity(kernel)?;
    let spectrum = singular_values(affinity.view());

    let mut powered = spectrum.clone();
    let mut values = Vec::with_capacity(t_max);
    for _ in 0..t_max {
        let h = shannon_entropy(&powered);
        values.push(T::from(h).unwrap_or_else(T::nan));
        for (p, &s) in powered.iter_mut().zip(spectrum.iter()) {
            *p *= s;
        }
        // Entropy is scale-free; keep the running powers away from overflow.
        let peak = powered.iter().copied().fold(0.0_f64, f64::max);
        if peak.is_finite() && peak > 0.0 {
            powered.iter_mut().for_each(|p| *p /= peak);
        }
    }

    Ok(EntropyCurve { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    #[test]
    fn identity_kernel_has_maximal_flat_entropy() {
        let k = Array2::<f64>::eye(6);
        let curve = von_neumann_entropy(k.view(), 10).unwrap();
        assert_eq!(curve.len(), 10);
        for (_, h) in curve.iter() {
            assert_abs_diff_eq!(h, 6.0_f64.ln(), epsilon = 1e-9);
        }
    }

    #[test]
    fn entropy_decays_for_connected_kernel() {
        let k: Array2<f64> = array![
            [2.0, 1.5, 0.2, 0.0],
            [1.5, 2.0, 0.8, 0.1],
            [0.2, 0.8, 2.0, 1.2],
            [0.0, 0.1, 1.2, 2.0]
        ];
        let curve = von_neumann_entropy(k.view(), 20).unwrap();
        let first = curve.at(1).unwrap();
        let last = curve.at(20).unwrap();
        assert!(last < first);
        assert_eq!(curve.at(0), None);
        assert_eq!(curve.at(21), None);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let k = Array2::<f64>::eye(3);
        assert_eq!(
            von_neumann_entropy(k.view(), 0),
            Err(PhateError::InvalidEntropyHorizon(0))
        );
    }

    #[test]
    fn display_lists_every_time() {
        let curve = EntropyCurve { values: vec![1.0_f64, 0.5] };
        let text = curve.to_string();
        assert!(text.contains("Diffusion times: 2"));
        assert_eq!(text.lines().filter(|l| l.trim_start().starts_with('1')).count(), 1);
    }
}

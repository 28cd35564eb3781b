//! Shannon entropy of a non-negative weight vector.

use num_traits::Float;

/// Entropy `-Σ p·ln(p)` of `weights` normalised to a probability distribution.
///
/// Non-positive (and non-finite) weights are dropped before normalising, so
/// they contribute nothing and never reach `ln`. Returns 0 when no positive
/// weight remains.
pub fn shannon_entropy<T: Float>(weights: &[T]) -> T {
    let total = weights
        .iter()
        .copied()
        .filter(|w| w.is_finite() && *w > T::zero())
        .fold(T::zero(), |acc, w| acc + w);
    if total <= T::zero() {
        return T::zero();
    }

    weights
        .iter()
        .copied()
        .filter(|w| w.is_finite() && *w > T::zero())
        .map(|w| w / total)
        .filter(|p| *p > T::zero())
        .fold(T::zero(), |acc, p| acc - p * p.ln())
}

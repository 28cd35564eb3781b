//! Layer 3: Algorithms
//!
//! The numerical stages of the diffusion pipeline.
//!
//! # Pipeline
//!
//! ```text
//! data ──kernel──▶ affinity K ──operator──▶ P (row-stochastic) ──potential──▶ -ln(Pᵗ)
//! ```
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 5: Engine (cache, executor, output, validator)
//!   ↓
//! Layer 4: Evaluation (entropy) / Embedding (mds)
//!   ↓
//! Layer 3: Algorithms ← You are here
//!   ↓
//! Layer 2: Math (distance, linalg, entropy)
//!   ↓
//! Layer 1: Primitives (checks, errors, float, input, progress)
//! ```

/// Adaptive-bandwidth affinity kernel.
///
/// Provides:
/// - Per-point k-th neighbour bandwidths
/// - Exponential kernel with additive symmetrisation
/// - Duplicate-point detection
pub mod kernel;

/// Row-stochastic diffusion operator.
///
/// Provides:
/// - Kernel row normalisation
/// - Precomputed operator pass-through
pub mod operator;

/// Diffusion potential.
///
/// Provides:
/// - Exact integer operator powers
/// - Epsilon-floored negative log transform
pub mod potential;

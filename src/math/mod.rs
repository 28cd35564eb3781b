//! Layer 2: Math
//!
//! Pure mathematical functions.
//!
//! This layer provides pure mathematical functions used throughout the
//! diffusion pipeline:
//! - Distance metrics and pairwise distance matrices
//! - Dense linear algebra (integer matrix powers, spectral bridge)
//! - Shannon entropy of a spectrum
//!
//! These are reusable mathematical building blocks with no pipeline-specific logic.
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
//! Layer 3: Algorithms (kernel, operator, potential)
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives (checks, errors, float, input, progress)
//! ```

/// Distance metrics.
///
/// Provides:
/// - The closed `DistanceMetric` enumeration
/// - Name parsing via `FromStr`
/// - Dense pairwise distance matrices
pub mod distance;

/// Dense linear algebra.
///
/// Provides:
/// - Exact integer matrix powers
/// - Row/column sums and symmetrisation
/// - Singular values and sorted symmetric eigenpairs via nalgebra
pub mod linalg;

/// Shannon entropy.
pub mod entropy;

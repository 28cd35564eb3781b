//! Layer 4: Evaluation
//!
//! Diagnostics computed from fitted artifacts.
//!
//! This layer holds analyses that read pipeline artifacts without being part
//! of the embedding path itself:
//! - Von Neumann entropy for diffusion-time selection
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 5: Engine (cache, executor, output, validator)
//!   ↓
//! Layer 4: Evaluation ← You are here
//!   ↓
//! Layer 3: Algorithms (kernel, operator, potential)
//!   ↓
//! Layer 2: Math (distance, linalg, entropy)
//!   ↓
//! Layer 1: Primitives (checks, errors, float, input, progress)
//! ```

/// Von Neumann entropy of the diffusion affinities.
///
/// Provides:
/// - The `EntropyCurve` result type
/// - Spectral entropy sweep over diffusion times
pub mod entropy;

//! Layer 5: Engine
//!
//! Cached execution of the PHATE pipeline.
//!
//! This layer owns the pipeline state: which artifacts exist, which
//! parameters they were built from, and which must be rebuilt after a change.
//! It sequences the algorithm stages and the embedder over that state.
//!
//! # Module Organization
//!
//! - **cache**: Stamped artifacts and pure invalidation transitions
//! - **executor**: Stage sequencing with progress logging
//! - **validator**: Input and configuration validation rules
//! - **output**: Per-stage build counters
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 5: Engine ← You are here
//!   ↓
//! Layer 4: Evaluation (entropy) / Embedding (mds)
//!   ↓
//! Layer 3: Algorithms (kernel, operator, potential)
//!   ↓
//! Layer 2: Math (distance, linalg, entropy)
//!   ↓
//! Layer 1: Primitives (checks, errors, float, input, progress)
//! ```

/// Cached artifacts and invalidation.
///
/// Provides:
/// - Lineage stamps for kernel, operator, potential and embedding
/// - Pure `fit` / `transform` transitions
/// - Explicit downstream invalidation hooks
pub mod cache;

/// Pipeline execution engine.
///
/// Provides:
/// - The resolved `PhateConfig`
/// - Rebuilding of missing artifacts after a transition
pub mod executor;

/// Validation utilities.
///
/// Provides:
/// - Checks for data consistency (shape, finiteness)
/// - Configuration bound validation
pub mod validator;

/// Output types.
///
/// Provides:
/// - The `PipelineStats` build counters
pub mod output;

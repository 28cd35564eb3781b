//! Layer 1: Primitives
//!
//! Core building blocks and types.
//!
//! This layer provides the primitive abstractions shared by every stage of
//! the diffusion pipeline. It has zero internal dependencies within the crate.
//!
//! # Module Organization
//!
//! - **checks**: Parameter bound checks shared by the stages
//! - **errors**: Shared error type (PhateError)
//! - **float**: Scalar bound for matrix elements
//! - **input**: Input matrix abstraction over ndarray and nested vectors
//! - **progress**: Verbosity-aware stage logging
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
//! Layer 2: Math (distance, linalg, entropy)
//!   ↓
//! Layer 1: Primitives ← You are here
//! ```

/// Parameter bound checks.
///
/// Provides:
/// - Free `check_*` functions for scalar parameters and matrix shape
pub mod checks;

/// Shared error types.
///
/// Provides:
/// - Unified `PhateError` enum
/// - Validation, numerical and usage-contract variants
pub mod errors;

/// Scalar trait bound.
///
/// Provides:
/// - `PhateFloat`, the element type bound for matrices
pub mod float;

/// Input abstraction.
///
/// Provides:
/// - The `PhateInput` trait
/// - Implementations for 2-D ndarray types and `Vec<Vec<T>>`
pub mod input;

/// Stage progress logging.
///
/// Provides:
/// - `progress!` macro routing to `info` or `debug` by verbosity
/// - `StageTimer` for elapsed-time reporting
pub mod progress;

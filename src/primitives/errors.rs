//! Error types for PHATE operations.
//!
//! ## Purpose
//!
//! This module defines [`PhateError`], the single error type returned by every
//! fallible operation in the crate: parameter validation, kernel construction,
//! operator normalisation, the cached pipeline and the entropy diagnostic.
//!
//! ## Design notes
//!
//! * Variants carry the offending values so messages are actionable.
//! * Numerical failures (duplicate data, isolated points) are detected and
//!   reported instead of being propagated as NaN or infinity.
//! * No variant is retryable: every failure needs different data or
//!   parameters from the caller.
//!
//! ## Visibility
//!
//! [`PhateError`] is part of the public API and re-exported from the crate root.

use thiserror::Error;

/// Errors produced while building or querying a PHATE embedding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhateError {
    /// The input matrix has no rows or no columns.
    #[error("input data is empty")]
    EmptyInput,

    /// Not enough observations for the requested neighbourhood.
    #[error("too few points: got {got}, need at least {min}")]
    TooFewPoints { got: usize, min: usize },

    /// A non-finite value (NaN or infinity) was found.
    #[error("invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// The kernel decay exponent `a` is not positive and finite.
    #[error("invalid kernel decay `a`: {0} (must be positive and finite)")]
    InvalidDecay(f64),

    /// The neighbour index `k` is zero.
    #[error("invalid neighbour index k=0 (must be at least 1)")]
    ZeroNeighbors,

    /// The neighbour index `k` is not smaller than the sample count.
    #[error("invalid neighbour index k={k} for {n_samples} samples (need k < n)")]
    InvalidNeighbors { k: usize, n_samples: usize },

    /// The diffusion time `t` is zero.
    #[error("invalid diffusion time t={0} (must be at least 1)")]
    InvalidDiffusionTime(usize),

    /// The embedding dimensionality is not 2 or 3.
    #[error("invalid n_components={0} (must be 2 or 3)")]
    InvalidComponents(usize),

    /// The entropy sweep length is zero.
    #[error("invalid t_max={0} for entropy diagnostic (must be at least 1)")]
    InvalidEntropyHorizon(usize),

    /// The SMACOF iteration budget is zero.
    #[error("invalid max_iter={0} for MDS (must be at least 1)")]
    InvalidMaxIterations(usize),

    /// The SMACOF convergence tolerance is not positive and finite.
    #[error("invalid MDS tolerance {0} (must be positive and finite)")]
    InvalidTolerance(f64),

    /// A distance metric name could not be parsed.
    #[error("unknown distance metric `{0}`; valid options: euclidean, sqeuclidean, cityblock, chebyshev, cosine, correlation, canberra, braycurtis")]
    UnknownMetric(String),

    /// An MDS variant name could not be parsed.
    #[error("unknown MDS method `{0}`; valid options: classic, metric, nonmetric")]
    UnknownMdsMethod(String),

    /// A matrix did not have the expected shape.
    #[error("shape mismatch for {what}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        got: (usize, usize),
    },

    /// A builder parameter was set more than once.
    #[error("parameter `{parameter}` was set multiple times")]
    DuplicateParameter { parameter: &'static str },

    /// At least `k` coincident points collapse the adaptive bandwidth of `row`.
    #[error(
        "it looks like you have at least k={k} identical data points (row {row} has a degenerate bandwidth); try removing duplicates"
    )]
    DuplicateData { k: usize, row: usize },

    /// A kernel row sums to zero, so the point is isolated from the graph.
    #[error("affinity row {row} sums to zero; point is disconnected under the chosen bandwidth and metric")]
    DegenerateKernel { row: usize },

    /// An operation needed an artifact that `fit` has not produced yet.
    #[error("this PHATE instance is not fitted yet; call `fit` before `{operation}`")]
    NotFitted { operation: &'static str },

    /// `transform` was given data different from the data passed to `fit`.
    #[error("a pre-fit PHATE operator cannot transform a new data matrix; call `fit` with the new data instead")]
    OutOfSample,

    /// Structurally invalid input (ragged rows, non-contiguous storage, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The worker pool for parallel MDS could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(String),
}

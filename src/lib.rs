//! # PHATE: diffusion-potential embeddings
//!
//! PHATE embeds high-dimensional point clouds into 2 or 3 dimensions by
//! modelling them as a diffusion process on a similarity graph. Distances
//! between the log-transformed, t-step diffusion probabilities (the
//! *potential*) are laid out with multidimensional scaling. Continuous,
//! branching and trajectory-like structure survives the projection.
//!
//! ## Quick start
//!
//! ```no_run
//! use ndarray::Array2;
//! use phate::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // Two separated clusters of 50 observations each.
//! let x: Array2<f64> = Array2::from_shape_fn((100, 10), |(i, j)| {
//!     ((i * 31 + j * 7) as f64 * 0.1).sin() + (i / 50) as f64 * 20.0
//! });
//!
//! let mut phate = Phate::builder()
//!     .k(5)
//!     .t(30)
//!     .random_state(42)
//!     .build()?;
//!
//! let embedding = phate.fit_transform(&x, None)?;
//! assert_eq!(embedding.dim(), (100, 2));
//!
//! // Only the potential and embedding are recomputed.
//! phate.transform(Some(10))?;
//!
//! // Entropy of the diffusion affinities, for choosing `t`.
//! let curve = phate.von_neumann_entropy(100)?;
//! println!("{}", curve);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! X (n × p) ──kernel──▶ K (n × n) ──operator──▶ P ──potential──▶ -ln(Pᵗ) ──MDS──▶ Y (n × d)
//!                        │
//!                        └──▶ Von Neumann entropy curve
//! ```
//!
//! Every intermediate is cached on the [`Phate`](api::Phate) estimator and
//! stamped with the parameters it was built from. A change of `t` recomputes
//! the potential and the embedding only; a change of `a`, `k` or the kNN
//! metric recomputes the graph; new data recomputes everything.
//!
//! ## Architecture
//!
//! ```text
//! Layer 7: API         (builder, estimator)
//!   ↓
//! Layer 5: Engine      (cache, executor, output, validator)
//!   ↓
//! Layer 4: Evaluation  (entropy) / Embedding (classic, smacof)
//!   ↓
//! Layer 3: Algorithms  (kernel, operator, potential)
//!   ↓
//! Layer 2: Math        (distance, linalg, entropy)
//!   ↓
//! Layer 1: Primitives  (errors, float, input, progress)
//! ```
//!
//! ## Logging
//!
//! Stage progress is emitted through [`tracing`] at `info` level when the
//! estimator is verbose (the default) and at `debug` level otherwise. The
//! crate never installs a subscriber.
//!
//! ## Features
//!
//! * `cpu` (default): parallel SMACOF restarts on a `rayon` pool sized by
//!   `n_jobs`.

// Layer 1: Primitives
mod primitives;

// Layer 2: Math
mod math;

// Layer 3: Algorithms
mod algorithms;

// Layer 4: Evaluation and embedding
mod embedding;
mod evaluation;

// Layer 5: Engine
mod engine;

// Layer 7: API
pub mod api;

/// Standard PHATE prelude.
pub mod prelude {
    pub use crate::api::{
        DistanceMetric, Embedder, EmbeddingRequest, EntropyCurve, KernelParams, Mds, MdsMethod,
        Phate, PhateBuilder, PhateConfig, PhateError, PipelineStats, Precomputed, Result,
    };
    pub use crate::primitives::float::PhateFloat;
    pub use crate::primitives::input::PhateInput;
}

/// Internal modules for stage-level access.
///
/// These expose the individual pipeline stages (kernel construction,
/// normalisation, potential, entropy, MDS) for callers that want to run them
/// without the caching estimator. They are less stable than [`api`].
pub mod internals {
    /// Layer 1: errors, scalar bound, input adapters, progress logging.
    pub mod primitives {
        pub use crate::primitives::*;
    }

    /// Layer 2: distances and dense linear algebra.
    pub mod math {
        pub use crate::math::*;
    }

    /// Layer 3: kernel, operator and potential stages.
    pub mod algorithms {
        pub use crate::algorithms::*;
    }

    /// Layer 4: diagnostics.
    pub mod evaluation {
        pub use crate::evaluation::*;
    }

    /// Layer 4: MDS embedders.
    pub mod embedding {
        pub use crate::embedding::*;
    }

    /// Layer 5: cache, executor, validation, stats.
    pub mod engine {
        pub use crate::engine::*;
    }
}

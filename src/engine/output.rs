//! Build counters for the cached pipeline.
//!
//! ## Purpose
//!
//! [`PipelineStats`] records how many times each stage actually ran over the
//! lifetime of an estimator. Cache hits do not count. This makes the caching
//! behaviour observable: a repeated `fit` on identical data leaves the kernel
//! and operator counters unchanged.
//!
//! ## Visibility
//!
//! Part of the public API, returned by `Phate::stats`.

use core::fmt;

/// Per-stage build counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Kernels built from data (precomputed kernels are not counted).
    pub kernel_builds: usize,

    /// Operators normalised from a kernel.
    pub operator_builds: usize,

    /// Operators taken from a caller-supplied override.
    pub operator_overrides: usize,

    /// Diffusion potentials computed.
    pub potential_builds: usize,

    /// Embeddings computed.
    pub embedding_builds: usize,
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline stage builds:")?;
        writeln!(f, "  Kernel:    {}", self.kernel_builds)?;
        writeln!(
            f,
            "  Operator:  {} ({} precomputed)",
            self.operator_builds, self.operator_overrides
        )?;
        writeln!(f, "  Potential: {}", self.potential_builds)?;
        writeln!(f, "  Embedding: {}", self.embedding_builds)
    }
}

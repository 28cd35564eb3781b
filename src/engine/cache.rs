//! Cached pipeline artifacts and their invalidation rules.
//!
//! ## Purpose
//!
//! This module owns the four cached artifacts of the pipeline (affinity
//! kernel, diffusion operator, diffusion potential, embedding) together with
//! the input matrix they were built from. Each artifact carries a stamp
//! recording exactly which parameters produced it.
//!
//! ## Design notes
//!
//! * Invalidation is expressed as pure transitions, `(old state, request) →
//!   new state`. They consume the cache and return it with stale artifacts
//!   removed; they never compute anything.
//! * Guards that can fail (`check_transform`) borrow the cache, so a rejected
//!   call leaves it untouched.
//! * Rebuilding the holes is the executor's job. A transition only decides
//!   what is missing.
//! * Stamps are compared by value. Precomputed overrides are compared
//!   element-wise, so re-supplying the same override keeps the cache.
//!
//! ## Key concepts
//!
//! ### Lineage
//!
//! ```text
//! data ─┬─▶ kernel [KernelStamp] ─▶ operator [OperatorStamp] ─▶ potential [t] ─▶ embedding [EmbeddingKey]
//!       └─────────────(precomputed operator)───────┘
//! ```
//!
//! Clearing an artifact clears everything to its right.
//!
//! ## Invariants
//!
//! * A potential is only present when an operator is present.
//! * An embedding is only present when a potential is present.
//! * New data (element-wise different) clears every artifact.
//!
//! ## Visibility
//!
//! Internal to the crate. The estimator exposes read-only accessors.

use ndarray::{Array2, ArrayView2};

use crate::algorithms::kernel::KernelParams;
use crate::algorithms::operator::OperatorSource;
use crate::embedding::MdsMethod;
use crate::math::distance::DistanceMetric;
use crate::primitives::errors::PhateError;

// ============================================================================
// Requests
// ============================================================================

/// How the kernel should be obtained on the next fit.
#[derive(Debug, Clone, Copy)]
pub enum KernelSpec<'a, T> {
    /// Build from the data with these parameters.
    Build(KernelParams<T>),

    /// Use this caller-supplied kernel.
    Precomputed(ArrayView2<'a, T>),

    /// No kernel; a precomputed operator stands in for it.
    Skip,
}

/// How the operator should be obtained on the next fit.
#[derive(Debug, Clone, Copy)]
pub enum OperatorSpec<'a, T> {
    /// Row-normalise the kernel.
    FromKernel,

    /// Use this caller-supplied operator.
    Precomputed(ArrayView2<'a, T>),
}

/// Everything a fit transition needs to know.
#[derive(Debug, Clone, Copy)]
pub struct FitRequest<'a, T> {
    /// Observations the pipeline is fitted on.
    pub data: ArrayView2<'a, T>,

    /// Kernel source.
    pub kernel: KernelSpec<'a, T>,

    /// Operator source.
    pub operator: OperatorSpec<'a, T>,
}

/// Parameters that identify an embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingKey {
    /// Output dimensionality.
    pub n_components: usize,

    /// Scaling variant.
    pub method: MdsMethod,

    /// Metric between potential rows.
    pub metric: DistanceMetric,
}

// ============================================================================
// Stamps
// ============================================================================

/// Provenance of the cached kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelStamp<T> {
    /// Built from the data with these parameters.
    Built(KernelParams<T>),

    /// Supplied by the caller.
    Precomputed,
}

/// A cached artifact and the stamp it was built under.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<A, S> {
    /// The artifact.
    pub value: A,

    /// What it was built from.
    pub stamp: S,
}

impl<A, S> Stamped<A, S> {
    /// Pair an artifact with its stamp.
    pub fn new(value: A, stamp: S) -> Self {
        Self { value, stamp }
    }
}

// ============================================================================
// Cache State
// ============================================================================

/// The cached state of one estimator.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineCache<T> {
    /// Input matrix of the last fit.
    pub data: Option<Array2<T>>,

    /// Affinity kernel.
    pub kernel: Option<Stamped<Array2<T>, KernelStamp<T>>>,

    /// Diffusion operator.
    pub operator: Option<Stamped<Array2<T>, OperatorSource>>,

    /// Diffusion potential, stamped with its diffusion time.
    pub potential: Option<Stamped<Array2<T>, usize>>,

    /// Embedding coordinates.
    pub embedding: Option<Stamped<Array2<T>, EmbeddingKey>>,
}

impl<T> Default for PipelineCache<T> {
    fn default() -> Self {
        Self {
            data: None,
            kernel: None,
            operator: None,
            potential: None,
            embedding: None,
        }
    }
}

impl<T: Clone + PartialEq> PipelineCache<T> {
    // ========================================================================
    // Transitions
    // ========================================================================

    /// State after `fit` has been requested, before any stage runs.
    ///
    /// New data clears everything. A kernel whose stamp disagrees with the
    /// request is dropped together with its operator; an operator whose
    /// source disagrees is dropped alone. Whenever the operator is missing
    /// afterwards, the potential and embedding go too. The data is stored.
    pub fn reconcile_fit(self, request: &FitRequest<'_, T>) -> Self {
        let mut next = match &self.data {
            Some(prev) if *prev != request.data => Self::default(),
            _ => self,
        };

        if !next.kernel_matches(&request.kernel) {
            next = next.invalidate_graph();
        }
        if !next.operator_matches(&request.operator) {
            next = next.invalidate_operator();
        }
        if next.operator.is_none() {
            next = next.invalidate_potential();
        }

        next.data = Some(request.data.to_owned());
        next
    }

    /// Check that `transform` may run on this state.
    ///
    /// Fails with [`PhateError::OutOfSample`] when `data` differs from the
    /// fitted matrix and with [`PhateError::NotFitted`] when there is no
    /// operator.
    pub fn check_transform(&self, data: Option<ArrayView2<'_, T>>) -> Result<(), PhateError> {
        if let (Some(new), Some(prev)) = (data, &self.data) {
            if self.operator.is_some() && *prev != new {
                return Err(PhateError::OutOfSample);
            }
        }
        if self.operator.is_none() {
            return Err(PhateError::NotFitted {
                operation: "transform",
            });
        }
        Ok(())
    }

    /// State after `transform` has been requested, before any stage runs.
    ///
    /// A potential built for another `t` is dropped with its embedding, and
    /// an embedding built under another key is dropped.
    pub fn reconcile_transform(self, t: usize, key: &EmbeddingKey) -> Self {
        let mut next = self;
        if next.potential.as_ref().map_or(false, |p| p.stamp != t) {
            next = next.invalidate_potential();
        }
        if next.embedding.as_ref().map_or(false, |e| e.stamp != *key) {
            next = next.invalidate_embedding();
        }
        next
    }

    // ========================================================================
    // Explicit Invalidation
    // ========================================================================

    /// Drop the kernel and everything built from it. The data is kept.
    pub fn invalidate_graph(mut self) -> Self {
        self.kernel = None;
        self.invalidate_operator()
    }

    /// Drop the operator and everything built from it.
    pub fn invalidate_operator(mut self) -> Self {
        self.operator = None;
        self.invalidate_potential()
    }

    /// Drop the potential and the embedding.
    pub fn invalidate_potential(mut self) -> Self {
        self.potential = None;
        self.invalidate_embedding()
    }

    /// Drop the embedding only.
    pub fn invalidate_embedding(mut self) -> Self {
        self.embedding = None;
        self
    }

    // ========================================================================
    // Stamp Checks
    // ========================================================================

    fn kernel_matches(&self, spec: &KernelSpec<'_, T>) -> bool {
        match (spec, &self.kernel) {
            (KernelSpec::Build(params), Some(k)) => k.stamp == KernelStamp::Built(params.clone()),
            (KernelSpec::Precomputed(view), Some(k)) => {
                k.stamp == KernelStamp::Precomputed && k.value == *view
            }
            (KernelSpec::Skip, None) => true,
            (KernelSpec::Skip, Some(_)) => false,
            (_, None) => true,
        }
    }

    fn operator_matches(&self, spec: &OperatorSpec<'_, T>) -> bool {
        match (spec, &self.operator) {
            (OperatorSpec::FromKernel, Some(op)) => op.stamp == OperatorSource::Computed,
            (OperatorSpec::Precomputed(view), Some(op)) => {
                op.stamp == OperatorSource::Precomputed && op.value == *view
            }
            (_, None) => true,
        }
    }
}

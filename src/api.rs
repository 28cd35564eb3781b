//! High-level API for PHATE embeddings.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry points: the fluent
//! [`PhateBuilder`] and the [`Phate`] estimator it produces. The estimator
//! owns the cached pipeline state and exposes `fit` / `transform` /
//! `fit_transform`, the explicit invalidation hooks, parameter setters, and
//! the Von Neumann entropy diagnostic.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with defaults for every parameter.
//! * **Validated**: Parameters are checked in `build()` and in every setter,
//!   before any numeric work.
//! * **Incremental**: Repeated calls reuse every artifact whose inputs have
//!   not changed. See `engine::cache` for the rules.
//! * **Pluggable**: The embedding stage is any [`Embedder`]; the default is
//!   [`Mds`].
//!
//! ## Key concepts
//!
//! ### Configuration Flow
//!
//! 1. Create a [`PhateBuilder`] via `Phate::builder()`.
//! 2. Chain configuration methods (`.k()`, `.t()`, `.mds()`, ...).
//! 3. Call `.build()` (or `.build_with_embedder(..)`) to get a [`Phate`].
//! 4. Call `fit_transform(&x, None)` for the embedding.
//!
//! ### Out-of-sample data
//!
//! A fitted estimator only embeds the data it was fitted on. Passing other
//! data to [`Phate::transform_data`] fails with [`PhateError::OutOfSample`].
//!
//! ## Visibility
//!
//! This is the primary public API. Types re-exported here are considered stable.

use core::mem;
use core::result;

use ndarray::{Array2, ArrayView2};

use crate::engine::cache::{FitRequest, KernelSpec, OperatorSpec, PipelineCache};
use crate::engine::executor::PipelineExecutor;
use crate::engine::validator::Validator;
use crate::evaluation::entropy::von_neumann_entropy;
use crate::primitives::float::PhateFloat;
use crate::primitives::input::PhateInput;
use crate::primitives::progress::StageTimer;
use crate::progress;

// Publicly re-exported types
pub use crate::algorithms::kernel::KernelParams;
pub use crate::embedding::{Embedder, EmbeddingRequest, Mds, MdsMethod};
pub use crate::engine::executor::PhateConfig;
pub use crate::engine::output::PipelineStats;
pub use crate::evaluation::entropy::EntropyCurve;
pub use crate::math::distance::DistanceMetric;
pub use crate::primitives::errors::PhateError;

/// Result type alias for PHATE operations.
pub type Result<T> = result::Result<T, PhateError>;

// ============================================================================
// Precomputed Overrides
// ============================================================================

/// Caller-supplied replacements for the graph stages.
#[derive(Debug, Clone, Copy)]
pub enum Precomputed<'a, T> {
    /// An `n × n` affinity kernel; the operator is normalised from it.
    Kernel(ArrayView2<'a, T>),

    /// An `n × n` diffusion operator, used unchanged. No kernel is stored,
    /// so the entropy diagnostic is unavailable.
    Operator(ArrayView2<'a, T>),

    /// Both; the operator is used unchanged and the kernel feeds the
    /// entropy diagnostic.
    Both {
        /// Affinity kernel.
        kernel: ArrayView2<'a, T>,
        /// Diffusion operator.
        operator: ArrayView2<'a, T>,
    },
}

// ============================================================================
// Builder
// ============================================================================

/// Fluent builder for configuring a PHATE estimator.
#[derive(Debug, Clone)]
pub struct PhateBuilder<T> {
    /// Output dimensionality (2 or 3).
    pub n_components: Option<usize>,

    /// Kernel decay exponent.
    pub a: Option<T>,

    /// Neighbour index for adaptive bandwidths.
    pub k: Option<usize>,

    /// Diffusion time.
    pub t: Option<usize>,

    /// MDS variant.
    pub mds: Option<MdsMethod>,

    /// Metric for the kNN bandwidth graph.
    pub knn_dist: Option<DistanceMetric>,

    /// Metric between potential rows for MDS.
    pub mds_dist: Option<DistanceMetric>,

    /// Parallelism hint for MDS.
    pub n_jobs: Option<i32>,

    /// Seed for MDS initialisation.
    pub random_state: Option<u64>,

    /// Progress logging level.
    pub verbose: Option<bool>,

    /// SMACOF iteration budget.
    pub mds_max_iter: Option<usize>,

    /// SMACOF convergence tolerance.
    pub mds_eps: Option<f64>,

    /// Metric SMACOF restarts.
    pub mds_n_init: Option<usize>,

    /// Tracks if any parameter was set multiple times (for validation).
    pub(crate) duplicate_param: Option<&'static str>,
}

impl<T: PhateFloat> Default for PhateBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PhateFloat> PhateBuilder<T> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            n_components: None,
            a: None,
            k: None,
            t: None,
            mds: None,
            knn_dist: None,
            mds_dist: None,
            n_jobs: None,
            random_state: None,
            verbose: None,
            mds_max_iter: None,
            mds_eps: None,
            mds_n_init: None,
            duplicate_param: None,
        }
    }

    /// Set the output dimensionality (2 or 3).
    pub fn n_components(mut self, n_components: usize) -> Self {
        if self.n_components.is_some() {
            self.duplicate_param = Some("n_components");
        }
        self.n_components = Some(n_components);
        self
    }

    /// Set the kernel decay exponent (default 10).
    pub fn a(mut self, a: T) -> Self {
        if self.a.is_some() {
            self.duplicate_param = Some("a");
        }
        self.a = Some(a);
        self
    }

    /// Set the neighbour index used as the adaptive bandwidth (default 5).
    pub fn k(mut self, k: usize) -> Self {
        if self.k.is_some() {
            self.duplicate_param = Some("k");
        }
        self.k = Some(k);
        self
    }

    /// Set the diffusion time (default 30).
    pub fn t(mut self, t: usize) -> Self {
        if self.t.is_some() {
            self.duplicate_param = Some("t");
        }
        self.t = Some(t);
        self
    }

    /// Set the MDS variant (default metric).
    pub fn mds(mut self, mds: MdsMethod) -> Self {
        if self.mds.is_some() {
            self.duplicate_param = Some("mds");
        }
        self.mds = Some(mds);
        self
    }

    /// Set the metric for the kNN bandwidth graph (default euclidean).
    pub fn knn_dist(mut self, metric: DistanceMetric) -> Self {
        if self.knn_dist.is_some() {
            self.duplicate_param = Some("knn_dist");
        }
        self.knn_dist = Some(metric);
        self
    }

    /// Set the metric between potential rows for MDS (default euclidean).
    pub fn mds_dist(mut self, metric: DistanceMetric) -> Self {
        if self.mds_dist.is_some() {
            self.duplicate_param = Some("mds_dist");
        }
        self.mds_dist = Some(metric);
        self
    }

    /// Set the MDS parallelism hint (default 1; `-1` for all CPUs).
    pub fn n_jobs(mut self, n_jobs: i32) -> Self {
        if self.n_jobs.is_some() {
            self.duplicate_param = Some("n_jobs");
        }
        self.n_jobs = Some(n_jobs);
        self
    }

    /// Seed the MDS initialisation.
    pub fn random_state(mut self, seed: u64) -> Self {
        if self.random_state.is_some() {
            self.duplicate_param = Some("random_state");
        }
        self.random_state = Some(seed);
        self
    }

    /// Log stage progress at `info` (true, default) or `debug` (false).
    pub fn verbose(mut self, verbose: bool) -> Self {
        if self.verbose.is_some() {
            self.duplicate_param = Some("verbose");
        }
        self.verbose = Some(verbose);
        self
    }

    /// Set the SMACOF iteration budget (default 3000).
    pub fn mds_max_iter(mut self, max_iter: usize) -> Self {
        if self.mds_max_iter.is_some() {
            self.duplicate_param = Some("mds_max_iter");
        }
        self.mds_max_iter = Some(max_iter);
        self
    }

    /// Set the SMACOF convergence tolerance (default 1e-6).
    pub fn mds_eps(mut self, eps: f64) -> Self {
        if self.mds_eps.is_some() {
            self.duplicate_param = Some("mds_eps");
        }
        self.mds_eps = Some(eps);
        self
    }

    /// Set the number of metric SMACOF runs (default 1).
    pub fn mds_n_init(mut self, n_init: usize) -> Self {
        if self.mds_n_init.is_some() {
            self.duplicate_param = Some("mds_n_init");
        }
        self.mds_n_init = Some(n_init);
        self
    }

    /// Validate the parameters and create an estimator with the default
    /// MDS embedder.
    pub fn build(self) -> Result<Phate<T, Mds>> {
        let defaults = Mds::default();
        let mds = Mds {
            max_iter: self.mds_max_iter.unwrap_or(defaults.max_iter),
            eps: self.mds_eps.unwrap_or(defaults.eps),
            n_init: self.mds_n_init.unwrap_or(defaults.n_init),
        };
        Validator::validate_max_iter(mds.max_iter)?;
        Validator::validate_tolerance(mds.eps)?;
        if mds.n_init == 0 {
            return Err(PhateError::InvalidInput(
                "mds_n_init must be at least 1".to_string(),
            ));
        }
        self.build_with_embedder(mds)
    }

    /// Validate the parameters and create an estimator around `embedder`.
    ///
    /// The `mds_max_iter`, `mds_eps` and `mds_n_init` settings only apply to
    /// [`Mds`] and are ignored here.
    pub fn build_with_embedder<E: Embedder<T>>(self, embedder: E) -> Result<Phate<T, E>> {
        Validator::validate_no_duplicates(self.duplicate_param)?;

        let defaults = PhateConfig::<T>::default();
        let config = PhateConfig {
            n_components: self.n_components.unwrap_or(defaults.n_components),
            kernel: KernelParams {
                a: self.a.unwrap_or(defaults.kernel.a),
                k: self.k.unwrap_or(defaults.kernel.k),
                knn_dist: self.knn_dist.unwrap_or(defaults.kernel.knn_dist),
            },
            t: self.t.unwrap_or(defaults.t),
            mds: self.mds.unwrap_or(defaults.mds),
            mds_dist: self.mds_dist.unwrap_or(defaults.mds_dist),
            n_jobs: self.n_jobs.unwrap_or(defaults.n_jobs),
            random_state: self.random_state.or(defaults.random_state),
            verbose: self.verbose.unwrap_or(defaults.verbose),
        };

        Validator::validate_components(config.n_components)?;
        Validator::validate_decay(config.kernel.a)?;
        Validator::validate_nonzero_neighbors(config.kernel.k)?;
        Validator::validate_diffusion_time(config.t)?;

        Ok(Phate {
            config,
            embedder,
            cache: PipelineCache::default(),
            stats: PipelineStats::default(),
        })
    }
}

// ============================================================================
// Estimator
// ============================================================================

/// PHATE estimator with cached pipeline state.
///
/// Not safe for concurrent mutation; share it behind a lock if needed.
#[derive(Debug, Clone)]
pub struct Phate<T, E = Mds> {
    config: PhateConfig<T>,
    embedder: E,
    cache: PipelineCache<T>,
    stats: PipelineStats,
}

impl<T: PhateFloat> Phate<T, Mds> {
    /// Start configuring an estimator.
    pub fn builder() -> PhateBuilder<T> {
        PhateBuilder::new()
    }
}

impl<T: PhateFloat, E: Embedder<T>> Phate<T, E> {
    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Build the kernel and diffusion operator for `x` (`n × p`).
    ///
    /// Nothing is recomputed when `x` and the kernel parameters match the
    /// previous fit.
    pub fn fit<I>(&mut self, x: &I) -> Result<&mut Self>
    where
        I: PhateInput<T> + ?Sized,
    {
        let data = x.as_phate_matrix()?;
        Validator::validate_inputs(data.view())?;
        let request = FitRequest {
            data: data.view(),
            kernel: KernelSpec::Build(self.config.kernel),
            operator: OperatorSpec::FromKernel,
        };
        self.run_fit(request)
    }

    /// Fit `x` using a precomputed kernel and/or operator.
    pub fn fit_precomputed<I>(&mut self, x: &I, precomputed: Precomputed<'_, T>) -> Result<&mut Self>
    where
        I: PhateInput<T> + ?Sized,
    {
        let data = x.as_phate_matrix()?;
        Validator::validate_inputs(data.view())?;
        let n = data.nrows();

        let (kernel, operator) = match precomputed {
            Precomputed::Kernel(k) => {
                Validator::validate_override(k, n, "precomputed kernel")?;
                (KernelSpec::Precomputed(k.reborrow()), OperatorSpec::FromKernel)
            }
            Precomputed::Operator(op) => {
                Validator::validate_override(op, n, "precomputed operator")?;
                (KernelSpec::Skip, OperatorSpec::Precomputed(op.reborrow()))
            }
            Precomputed::Both { kernel, operator } => {
                Validator::validate_override(kernel, n, "precomputed kernel")?;
                Validator::validate_override(operator, n, "precomputed operator")?;
                (
                    KernelSpec::Precomputed(kernel.reborrow()),
                    OperatorSpec::Precomputed(operator.reborrow()),
                )
            }
        };

        let request = FitRequest {
            data: data.view(),
            kernel,
            operator,
        };
        self.run_fit(request)
    }

    fn run_fit(&mut self, request: FitRequest<'_, T>) -> Result<&mut Self> {
        let (n, p) = request.data.dim();
        progress!(
            self.config.verbose,
            "Running PHATE on {} observations and {} features.",
            n,
            p
        );
        PipelineExecutor::fit(&mut self.cache, &mut self.stats, request, self.config.verbose)?;
        Ok(self)
    }

    /// Embed the fitted data, optionally at a new diffusion time.
    ///
    /// A new `t` recomputes the potential and embedding but never the kernel
    /// or operator.
    pub fn transform(&mut self, t: Option<usize>) -> Result<&Array2<T>> {
        self.run_transform(None, t)
    }

    /// Like [`transform`](Self::transform), but first checks that `x` is the
    /// fitted data. Any other matrix fails with [`PhateError::OutOfSample`].
    pub fn transform_data<I>(&mut self, x: &I, t: Option<usize>) -> Result<&Array2<T>>
    where
        I: PhateInput<T> + ?Sized,
    {
        let data = x.as_phate_matrix()?;
        self.run_transform(Some(data.view()), t)
    }

    /// `fit` followed by `transform`.
    pub fn fit_transform<I>(&mut self, x: &I, t: Option<usize>) -> Result<&Array2<T>>
    where
        I: PhateInput<T> + ?Sized,
    {
        let timer = StageTimer::start();
        self.fit(x)?;
        self.transform(t)?;
        progress!(
            self.config.verbose,
            "Calculated PHATE in {:.2} seconds.",
            timer.elapsed_secs()
        );
        self.embedding().ok_or(PhateError::NotFitted {
            operation: "fit_transform",
        })
    }

    fn run_transform(&mut self, data: Option<ArrayView2<'_, T>>, t: Option<usize>) -> Result<&Array2<T>> {
        let t = match t {
            Some(t) => {
                Validator::validate_diffusion_time(t)?;
                t
            }
            None => self.config.t,
        };
        // A rejected call leaves the configured `t` untouched.
        self.cache.check_transform(data)?;
        self.config.t = t;
        PipelineExecutor::transform(
            &mut self.cache,
            &mut self.stats,
            &self.config,
            &self.embedder,
            data,
        )?;
        self.embedding().ok_or(PhateError::NotFitted {
            operation: "transform",
        })
    }

    // ========================================================================
    // Invalidation Hooks
    // ========================================================================

    /// Replace MDS settings and drop the cached embedding.
    ///
    /// The potential and everything upstream are kept.
    pub fn reset_mds(
        &mut self,
        n_components: Option<usize>,
        mds: Option<MdsMethod>,
        mds_dist: Option<DistanceMetric>,
    ) -> Result<()> {
        if let Some(d) = n_components {
            Validator::validate_components(d)?;
            self.config.n_components = d;
        }
        if let Some(m) = mds {
            self.config.mds = m;
        }
        if let Some(metric) = mds_dist {
            self.config.mds_dist = metric;
        }
        self.cache = mem::take(&mut self.cache).invalidate_embedding();
        Ok(())
    }

    /// Replace the diffusion time and drop the potential and embedding.
    ///
    /// The kernel and operator are kept.
    pub fn reset_diffusion(&mut self, t: Option<usize>) -> Result<()> {
        if let Some(t) = t {
            Validator::validate_diffusion_time(t)?;
            self.config.t = t;
        }
        self.cache = mem::take(&mut self.cache).invalidate_potential();
        Ok(())
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Change the kernel decay. A different value drops the graph.
    pub fn set_a(&mut self, a: T) -> Result<()> {
        Validator::validate_decay(a)?;
        if a != self.config.kernel.a {
            self.config.kernel.a = a;
            self.cache = mem::take(&mut self.cache).invalidate_graph();
        }
        Ok(())
    }

    /// Change the neighbour index. A different value drops the graph.
    pub fn set_k(&mut self, k: usize) -> Result<()> {
        Validator::validate_nonzero_neighbors(k)?;
        if k != self.config.kernel.k {
            self.config.kernel.k = k;
            self.cache = mem::take(&mut self.cache).invalidate_graph();
        }
        Ok(())
    }

    /// Change the kNN metric. A different metric drops the graph.
    pub fn set_knn_dist(&mut self, metric: DistanceMetric) {
        if metric != self.config.kernel.knn_dist {
            self.config.kernel.knn_dist = metric;
            self.cache = mem::take(&mut self.cache).invalidate_graph();
        }
    }

    /// Change the diffusion time used by the next `transform`.
    pub fn set_t(&mut self, t: usize) -> Result<()> {
        Validator::validate_diffusion_time(t)?;
        self.config.t = t;
        Ok(())
    }

    /// Change the progress logging level.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Von Neumann entropy of the fitted kernel for `t = 1..=t_max`.
    ///
    /// Reads the kernel only; no cached artifact is touched.
    pub fn von_neumann_entropy(&self, t_max: usize) -> Result<EntropyCurve<T>> {
        let kernel = self.kernel().ok_or(PhateError::NotFitted {
            operation: "von_neumann_entropy",
        })?;
        von_neumann_entropy(kernel, t_max)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Resolved parameters.
    pub fn config(&self) -> &PhateConfig<T> {
        &self.config
    }

    /// The embedder.
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Cached affinity kernel, if present.
    pub fn kernel(&self) -> Option<ArrayView2<'_, T>> {
        self.cache.kernel.as_ref().map(|k| k.value.view())
    }

    /// Cached diffusion operator, if present.
    pub fn operator(&self) -> Option<ArrayView2<'_, T>> {
        self.cache.operator.as_ref().map(|op| op.value.view())
    }

    /// Cached diffusion potential, if present.
    pub fn potential(&self) -> Option<ArrayView2<'_, T>> {
        self.cache.potential.as_ref().map(|p| p.value.view())
    }

    /// Cached embedding, if present.
    pub fn embedding(&self) -> Option<&Array2<T>> {
        self.cache.embedding.as_ref().map(|e| &e.value)
    }

    /// Stage build counters.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documentation() {
        let phate = Phate::<f64>::builder().build().unwrap();
        let cfg = phate.config();
        assert_eq!(cfg.n_components, 2);
        assert_eq!(cfg.a(), 10.0);
        assert_eq!(cfg.k(), 5);
        assert_eq!(cfg.t, 30);
        assert_eq!(cfg.mds, MdsMethod::Metric);
        assert_eq!(cfg.n_jobs, 1);
        assert!(cfg.verbose);
        assert_eq!(phate.embedder().max_iter, 3000);
    }

    #[test]
    fn duplicate_setter_is_rejected() {
        let err = Phate::<f64>::builder().k(3).k(4).build().unwrap_err();
        assert_eq!(err, PhateError::DuplicateParameter { parameter: "k" });
    }

    #[test]
    fn invalid_parameters_fail_at_build() {
        assert_eq!(
            Phate::<f64>::builder().n_components(4).build().unwrap_err(),
            PhateError::InvalidComponents(4)
        );
        assert_eq!(
            Phate::<f64>::builder().t(0).build().unwrap_err(),
            PhateError::InvalidDiffusionTime(0)
        );
        assert!(matches!(
            Phate::<f64>::builder().a(-1.0).build(),
            Err(PhateError::InvalidDecay(_))
        ));
        assert!(matches!(
            Phate::<f64>::builder().mds_eps(0.0).build(),
            Err(PhateError::InvalidTolerance(_))
        ));
    }

    #[test]
    fn unfitted_estimator_reports_not_fitted() {
        let mut phate = Phate::<f64>::builder().verbose(false).build().unwrap();
        assert!(matches!(
            phate.transform(None),
            Err(PhateError::NotFitted { .. })
        ));
        assert!(matches!(
            phate.von_neumann_entropy(10),
            Err(PhateError::NotFitted { .. })
        ));
    }

    #[test]
    fn zero_neighbours_fail_at_build_and_in_setter() {
        assert_eq!(
            Phate::<f64>::builder().k(0).build().unwrap_err(),
            PhateError::ZeroNeighbors
        );
        let mut phate = Phate::<f64>::builder().verbose(false).build().unwrap();
        assert_eq!(phate.set_k(0), Err(PhateError::ZeroNeighbors));
        assert_eq!(phate.config().k(), 5);
    }

    #[test]
    fn failed_transform_keeps_diffusion_time() {
        let mut phate = Phate::<f64>::builder().verbose(false).build().unwrap();
        assert!(phate.transform(Some(4)).is_err());
        assert_eq!(phate.config().t, 30);
    }

    #[test]
    fn reset_mds_validates_components() {
        let mut phate = Phate::<f64>::builder().verbose(false).build().unwrap();
        assert_eq!(
            phate.reset_mds(Some(1), None, None),
            Err(PhateError::InvalidComponents(1))
        );
        phate
            .reset_mds(Some(3), Some(MdsMethod::Classic), Some(DistanceMetric::Cosine))
            .unwrap();
        assert_eq!(phate.config().n_components, 3);
        assert_eq!(phate.config().mds_dist, DistanceMetric::Cosine);
    }
}

//! Execution engine for the cached PHATE pipeline.
//!
//! ## Purpose
//!
//! This module sequences the pipeline stages over a [`PipelineCache`]. Each
//! entry point first applies the matching cache transition, then rebuilds
//! only the artifacts that transition left missing.
//!
//! ## Design notes
//!
//! * The executor holds no state of its own. The cache and the build
//!   counters are passed in by the estimator that owns them.
//! * Every stage reports start and completion (with elapsed seconds) through
//!   the `progress!` macro.
//! * A stage that fails leaves the cache consistent: earlier artifacts stay,
//!   the failed one and everything after it are absent.
//!
//! ## Key concepts
//!
//! ### Execution Flow
//!
//! `fit`:
//! 1. Reconcile the cache against the data and kernel/operator sources
//! 2. Build or adopt the kernel (if missing)
//! 3. Normalise or adopt the operator (if missing)
//!
//! `transform`:
//! 1. Guard against out-of-sample data and an unfitted state
//! 2. Reconcile against `t` and the embedding key
//! 3. Compute the potential (if missing)
//! 4. Run the embedder (if missing)
//!
//! ## Non-goals
//!
//! * This module does not validate builder parameters (handled by `validator`).
//!
//! ## Visibility
//!
//! Internal to the crate. [`PhateConfig`] is re-exported for inspection.

use core::mem;

use ndarray::ArrayView2;
use num_traits::Float;

use crate::algorithms::kernel::{build_kernel, KernelParams};
use crate::algorithms::operator::{resolve_operator, OperatorSource};
use crate::algorithms::potential::diffusion_potential;
use crate::embedding::{Embedder, EmbeddingRequest, MdsMethod};
use crate::engine::cache::{
    EmbeddingKey, FitRequest, KernelSpec, KernelStamp, OperatorSpec, PipelineCache, Stamped,
};
use crate::engine::output::PipelineStats;
use crate::math::distance::DistanceMetric;
use crate::primitives::errors::PhateError;
use crate::primitives::float::PhateFloat;
use crate::primitives::progress::StageTimer;
use crate::progress;

// ============================================================================
// Configuration
// ============================================================================

/// Resolved estimator parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhateConfig<T> {
    /// Output dimensionality (2 or 3).
    pub n_components: usize,

    /// Kernel decay, neighbour index and input metric.
    pub kernel: KernelParams<T>,

    /// Diffusion time.
    pub t: usize,

    /// MDS variant.
    pub mds: MdsMethod,

    /// Metric between potential rows.
    pub mds_dist: DistanceMetric,

    /// Parallelism hint for the embedder.
    pub n_jobs: i32,

    /// Seed for randomised embedder initialisation.
    pub random_state: Option<u64>,

    /// Log stage progress at `info` instead of `debug`.
    pub verbose: bool,
}

impl<T: Float> Default for PhateConfig<T> {
    fn default() -> Self {
        Self {
            n_components: 2,
            kernel: KernelParams::default(),
            t: 30,
            mds: MdsMethod::Metric,
            mds_dist: DistanceMetric::Euclidean,
            n_jobs: 1,
            random_state: None,
            verbose: true,
        }
    }
}

impl<T: Copy> PhateConfig<T> {
    /// Kernel decay exponent.
    pub fn a(&self) -> T {
        self.kernel.a
    }

    /// Neighbour index.
    pub fn k(&self) -> usize {
        self.kernel.k
    }

    /// Key identifying embeddings built under this configuration.
    pub fn embedding_key(&self) -> EmbeddingKey {
        EmbeddingKey {
            n_components: self.n_components,
            method: self.mds,
            metric: self.mds_dist,
        }
    }

    /// Request handed to the embedder.
    pub fn embedding_request(&self) -> EmbeddingRequest {
        EmbeddingRequest {
            n_components: self.n_components,
            method: self.mds,
            metric: self.mds_dist,
            n_jobs: self.n_jobs,
            random_state: self.random_state,
        }
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Stage sequencing over a borrowed cache.
pub struct PipelineExecutor;

impl PipelineExecutor {
    /// Bring the kernel and operator up to date for `request`.
    pub fn fit<T: PhateFloat>(
        cache: &mut PipelineCache<T>,
        stats: &mut PipelineStats,
        request: FitRequest<'_, T>,
        verbose: bool,
    ) -> Result<(), PhateError> {
        *cache = mem::take(cache).reconcile_fit(&request);

        if cache.kernel.is_some() && cache.operator.is_some() {
            progress!(verbose, "Using cached graph and diffusion operator.");
            return Ok(());
        }

        let (n, p) = request.data.dim();
        progress!(verbose, n_samples = n, n_features = p, "Calculating graph and diffusion operator...");
        let timer = StageTimer::start();

        if cache.kernel.is_none() {
            match request.kernel {
                KernelSpec::Build(params) => {
                    let kernel = build_kernel(request.data, &params)?;
                    stats.kernel_builds += 1;
                    cache.kernel = Some(Stamped::new(kernel, KernelStamp::Built(params)));
                }
                KernelSpec::Precomputed(kernel) => {
                    progress!(verbose, "Using precomputed affinity kernel...");
                    cache.kernel = Some(Stamped::new(kernel.to_owned(), KernelStamp::Precomputed));
                }
                KernelSpec::Skip => {}
            }
        }

        if cache.operator.is_none() {
            let precomputed = match request.operator {
                OperatorSpec::Precomputed(op) => Some(op.to_owned()),
                OperatorSpec::FromKernel => None,
            };
            let kernel = cache.kernel.as_ref().map(|k| k.value.view());
            let (operator, source) = resolve_operator(kernel, precomputed)?;
            match source {
                OperatorSource::Computed => stats.operator_builds += 1,
                OperatorSource::Precomputed => {
                    progress!(verbose, "Using precomputed diffusion operator...");
                    stats.operator_overrides += 1;
                }
            }
            cache.operator = Some(Stamped::new(operator, source));
        }

        progress!(
            verbose,
            "Calculated graph and diffusion operator in {:.2} seconds.",
            timer.elapsed_secs()
        );
        Ok(())
    }

    /// Bring the potential and embedding up to date for `config`.
    pub fn transform<T, E>(
        cache: &mut PipelineCache<T>,
        stats: &mut PipelineStats,
        config: &PhateConfig<T>,
        embedder: &E,
        data: Option<ArrayView2<'_, T>>,
    ) -> Result<(), PhateError>
    where
        T: PhateFloat,
        E: Embedder<T> + ?Sized,
    {
        cache.check_transform(data)?;
        let key = config.embedding_key();
        *cache = mem::take(cache).reconcile_transform(config.t, &key);

        if cache.potential.is_none() {
            let operator = cache.operator.as_ref().ok_or(PhateError::NotFitted {
                operation: "transform",
            })?;
            progress!(config.verbose, t = config.t, "Calculating diffusion potential...");
            let timer = StageTimer::start();
            let potential = diffusion_potential(operator.value.view(), config.t)?;
            stats.potential_builds += 1;
            cache.potential = Some(Stamped::new(potential, config.t));
            progress!(
                config.verbose,
                "Calculated diffusion potential in {:.2} seconds.",
                timer.elapsed_secs()
            );
        }

        if cache.embedding.is_none() {
            let potential = cache.potential.as_ref().ok_or(PhateError::NotFitted {
                operation: "transform",
            })?;
            progress!(config.verbose, "Calculating {} MDS...", config.mds);
            let timer = StageTimer::start();
            let embedding = embedder.embed(potential.value.view(), &config.embedding_request())?;

            let n = potential.value.nrows();
            if embedding.dim() != (n, config.n_components) {
                return Err(PhateError::ShapeMismatch {
                    what: "embedding",
                    expected: (n, config.n_components),
                    got: embedding.dim(),
                });
            }
            stats.embedding_builds += 1;
            cache.embedding = Some(Stamped::new(embedding, key));
            progress!(
                config.verbose,
                "Calculated {} MDS in {:.2} seconds.",
                config.mds,
                timer.elapsed_secs()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::Mds;
    use ndarray::{array, Array2};

    fn data() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [1.0, 0.2],
            [2.1, -0.1],
            [2.9, 0.4],
            [4.2, 0.1],
            [5.0, -0.3]
        ]
    }

    fn config() -> PhateConfig<f64> {
        PhateConfig {
            kernel: KernelParams {
                k: 2,
                ..KernelParams::default()
            },
            t: 5,
            verbose: false,
            random_state: Some(0),
            ..PhateConfig::default()
        }
    }

    #[test]
    fn fit_then_transform_fills_every_artifact() {
        let x = data();
        let cfg = config();
        let mut cache = PipelineCache::default();
        let mut stats = PipelineStats::default();
        let request = FitRequest {
            data: x.view(),
            kernel: KernelSpec::Build(cfg.kernel),
            operator: OperatorSpec::FromKernel,
        };
        PipelineExecutor::fit(&mut cache, &mut stats, request, false).unwrap();
        PipelineExecutor::transform(&mut cache, &mut stats, &cfg, &Mds::default(), None).unwrap();

        assert!(cache.kernel.is_some());
        assert!(cache.operator.is_some());
        assert!(cache.potential.is_some());
        assert_eq!(cache.embedding.as_ref().map(|e| e.value.dim()), Some((6, 2)));
        assert_eq!(stats.kernel_builds, 1);
        assert_eq!(stats.embedding_builds, 1);
    }

    #[test]
    fn wrong_embedding_shape_is_rejected() {
        let x = data();
        let cfg = config();
        let mut cache = PipelineCache::default();
        let mut stats = PipelineStats::default();
        let request = FitRequest {
            data: x.view(),
            kernel: KernelSpec::Build(cfg.kernel),
            operator: OperatorSpec::FromKernel,
        };
        PipelineExecutor::fit(&mut cache, &mut stats, request, false).unwrap();

        let bad = |p: ArrayView2<'_, f64>, _: &EmbeddingRequest| -> Result<Array2<f64>, PhateError> {
            Ok(Array2::zeros((p.nrows(), 7)))
        };
        let err = PipelineExecutor::transform(&mut cache, &mut stats, &cfg, &bad, None);
        assert!(matches!(err, Err(PhateError::ShapeMismatch { what: "embedding", .. })));
        assert!(cache.potential.is_some());
        assert!(cache.embedding.is_none());
    }
}

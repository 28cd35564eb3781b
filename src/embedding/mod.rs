//! Layer 4: Embedding
//!
//! Low-dimensional layout of the diffusion potential.
//!
//! The pipeline hands the potential to an [`Embedder`] together with an
//! [`EmbeddingRequest`] and stores whatever coordinates come back. The
//! default embedder, [`Mds`], runs multidimensional scaling on distances
//! between potential rows:
//!
//! ```text
//! potential ──mds_dist──▶ dissimilarities ──classic──▶ init ──SMACOF──▶ metric ──SMACOF──▶ nonmetric
//! ```
//!
//! # Architecture
//!
//! ```text
//! Layer 7: API
//!   ↓
//! Layer 5: Engine (cache, executor, output, validator)
//!   ↓
//! Layer 4: Evaluation (entropy) / Embedding ← You are here
//!   ↓
//! Layer 3: Algorithms (kernel, operator, potential)
//!   ↓
//! Layer 2: Math (distance, linalg, entropy)
//!   ↓
//! Layer 1: Primitives (checks, errors, float, input, progress)
//! ```

use core::fmt;
use core::str::FromStr;

use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

#[cfg(feature = "cpu")]
use rayon::prelude::*;

use crate::math::distance::{pairwise_distances, DistanceMetric};
use crate::primitives::checks;
use crate::primitives::errors::PhateError;
use crate::primitives::float::PhateFloat;

/// Classical (Torgerson) scaling.
pub mod classic;

/// Metric and non-metric stress majorisation.
pub mod smacof;

use classic::classical_mds;
use smacof::{smacof, SmacofOutput, SmacofParams};

// ============================================================================
// MDS Variant
// ============================================================================

/// Multidimensional scaling variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MdsMethod {
    /// Classical scaling only.
    Classic,

    /// Metric SMACOF from the classical solution.
    #[default]
    Metric,

    /// Non-metric SMACOF from the metric solution.
    NonMetric,
}

impl MdsMethod {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MdsMethod::Classic => "classic",
            MdsMethod::Metric => "metric",
            MdsMethod::NonMetric => "nonmetric",
        }
    }
}

impl fmt::Display for MdsMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MdsMethod {
    type Err = PhateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" | "classical" | "cmds" => Ok(MdsMethod::Classic),
            "metric" | "mmds" => Ok(MdsMethod::Metric),
            "nonmetric" | "non-metric" | "nmmds" => Ok(MdsMethod::NonMetric),
            _ => Err(PhateError::UnknownMdsMethod(s.to_string())),
        }
    }
}

// ============================================================================
// Embedder Seam
// ============================================================================

/// Everything an embedder needs besides the potential itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddingRequest {
    /// Output dimensionality (2 or 3).
    pub n_components: usize,

    /// Scaling variant.
    pub method: MdsMethod,

    /// Metric between potential rows.
    pub metric: DistanceMetric,

    /// Worker count; `-1` means all CPUs, `-2` all but one, and so on.
    pub n_jobs: i32,

    /// Seed for any randomised initialisation.
    pub random_state: Option<u64>,
}

/// Maps an `n × n` diffusion potential to `n × n_components` coordinates.
///
/// Implemented by [`Mds`] and by any closure with the same signature.
pub trait Embedder<T: PhateFloat> {
    /// Compute the embedding of `potential`.
    fn embed(
        &self,
        potential: ArrayView2<'_, T>,
        request: &EmbeddingRequest,
    ) -> Result<Array2<T>, PhateError>;
}

impl<T, F> Embedder<T> for F
where
    T: PhateFloat,
    F: Fn(ArrayView2<'_, T>, &EmbeddingRequest) -> Result<Array2<T>, PhateError>,
{
    fn embed(
        &self,
        potential: ArrayView2<'_, T>,
        request: &EmbeddingRequest,
    ) -> Result<Array2<T>, PhateError> {
        self(potential, request)
    }
}

// ============================================================================
// Default MDS Embedder
// ============================================================================

/// Classical, metric or non-metric MDS of the potential rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mds {
    /// SMACOF iteration budget per run.
    pub max_iter: usize,

    /// SMACOF convergence tolerance.
    pub eps: f64,

    /// Metric SMACOF runs; the first starts from classical scaling, the rest
    /// from seeded uniform random layouts. The lowest-stress run wins.
    pub n_init: usize,
}

impl Default for Mds {
    fn default() -> Self {
        Self {
            max_iter: 3000,
            eps: 1e-6,
            n_init: 1,
        }
    }
}

impl<T: PhateFloat> Embedder<T> for Mds {
    fn embed(
        &self,
        potential: ArrayView2<'_, T>,
        request: &EmbeddingRequest,
    ) -> Result<Array2<T>, PhateError> {
        checks::check_components(request.n_components)?;
        checks::check_max_iter(self.max_iter)?;
        checks::check_tolerance(self.eps)?;

        let dissimilarities = pairwise_distances(potential, request.metric)
            .mapv(|v| v.to_f64().unwrap_or(f64::NAN));
        checks::check_finite(dissimilarities.view(), "potential distances")?;

        let classic = classical_mds(dissimilarities.view(), request.n_components);
        let coords = match request.method {
            MdsMethod::Classic => classic,
            MdsMethod::Metric => self.metric_runs(&dissimilarities, classic, request)?,
            MdsMethod::NonMetric => {
                let metric = self.metric_runs(&dissimilarities, classic, request)?;
                let params = SmacofParams {
                    metric: false,
                    max_iter: self.max_iter,
                    eps: self.eps,
                };
                let out = smacof(dissimilarities.view(), metric, &params);
                debug!(stress = out.stress, iterations = out.iterations, "non-metric SMACOF");
                out.embedding
            }
        };

        Ok(coords.mapv(|v| T::from(v).unwrap_or_else(T::nan)))
    }
}

impl Mds {
    /// Run metric SMACOF from `classic` plus `n_init - 1` random starts.
    fn metric_runs(
        &self,
        dissimilarities: &Array2<f64>,
        classic: Array2<f64>,
        request: &EmbeddingRequest,
    ) -> Result<Array2<f64>, PhateError> {
        let params = SmacofParams {
            metric: true,
            max_iter: self.max_iter,
            eps: self.eps,
        };
        let shape = classic.dim();
        let mut inits = Vec::with_capacity(self.n_init.max(1));
        inits.push(classic);
        for run in 1..self.n_init.max(1) {
            inits.push(random_layout(shape, request.random_state, run as u64));
        }

        let threads = resolve_n_jobs(request.n_jobs);
        let outputs = run_smacof(dissimilarities, inits, &params, threads)?;

        let best = outputs
            .into_iter()
            .enumerate()
            .filter(|(_, o)| o.stress.is_finite())
            .min_by(|(_, a), (_, b)| a.stress.total_cmp(&b.stress));
        match best {
            Some((run, out)) => {
                debug!(run, stress = out.stress, iterations = out.iterations, "metric SMACOF");
                Ok(out.embedding)
            }
            None => Err(PhateError::InvalidNumericValue(
                "MDS stress did not converge to a finite value".to_string(),
            )),
        }
    }
}

/// Uniform `[0, 1)` starting layout for restart `run`.
fn random_layout(shape: (usize, usize), seed: Option<u64>, run: u64) -> Array2<f64> {
    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s.wrapping_add(run)),
        None => ChaCha8Rng::from_entropy(),
    };
    Array2::from_shape_simple_fn(shape, || rng.gen::<f64>())
}

#[cfg(feature = "cpu")]
fn run_smacof(
    dissimilarities: &Array2<f64>,
    inits: Vec<Array2<f64>>,
    params: &SmacofParams,
    threads: usize,
) -> Result<Vec<SmacofOutput>, PhateError> {
    if threads <= 1 || inits.len() <= 1 {
        return Ok(inits
            .into_iter()
            .map(|init| smacof(dissimilarities.view(), init, params))
            .collect());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| PhateError::ThreadPool(e.to_string()))?;
    Ok(pool.install(|| {
        inits
            .into_par_iter()
            .map(|init| smacof(dissimilarities.view(), init, params))
            .collect()
    }))
}

#[cfg(not(feature = "cpu"))]
fn run_smacof(
    dissimilarities: &Array2<f64>,
    inits: Vec<Array2<f64>>,
    params: &SmacofParams,
    _threads: usize,
) -> Result<Vec<SmacofOutput>, PhateError> {
    Ok(inits
        .into_iter()
        .map(|init| smacof(dissimilarities.view(), init, params))
        .collect())
}

/// Translate an `n_jobs` request into a worker count.
///
/// Positive values are taken as-is. `-1` uses every CPU; below that,
/// `n_cpus + 1 + n_jobs` workers are used, never fewer than one. `0` is
/// treated as a single worker.
pub fn resolve_n_jobs(n_jobs: i32) -> usize {
    if n_jobs > 0 {
        return n_jobs as usize;
    }
    if n_jobs == 0 {
        return 1;
    }
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1) as i64;
    (cpus + 1 + n_jobs as i64).max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn request(method: MdsMethod) -> EmbeddingRequest {
        EmbeddingRequest {
            n_components: 2,
            method,
            metric: DistanceMetric::Euclidean,
            n_jobs: 1,
            random_state: Some(42),
        }
    }

    fn potential() -> Array2<f64> {
        array![
            [0.0, 1.0, 4.0, 5.0],
            [1.0, 0.0, 4.5, 4.0],
            [4.0, 4.5, 0.0, 1.2],
            [5.0, 4.0, 1.2, 0.0],
            [2.0, 2.5, 2.0, 2.5]
        ]
    }

    #[test]
    fn parses_method_names() {
        assert_eq!("classic".parse::<MdsMethod>().unwrap(), MdsMethod::Classic);
        assert_eq!("Metric".parse::<MdsMethod>().unwrap(), MdsMethod::Metric);
        assert_eq!("nonmetric".parse::<MdsMethod>().unwrap(), MdsMethod::NonMetric);
        assert!(matches!(
            "tsne".parse::<MdsMethod>(),
            Err(PhateError::UnknownMdsMethod(_))
        ));
    }

    #[test]
    fn every_method_yields_finite_coordinates() {
        let p = potential();
        for method in [MdsMethod::Classic, MdsMethod::Metric, MdsMethod::NonMetric] {
            let y = Mds::default().embed(p.view(), &request(method)).unwrap();
            assert_eq!(y.dim(), (5, 2));
            assert!(y.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn seeded_restarts_are_reproducible() {
        let p = potential();
        let mds = Mds { n_init: 4, ..Mds::default() };
        let req = EmbeddingRequest { n_jobs: 2, ..request(MdsMethod::Metric) };
        let a = mds.embed(p.view(), &req).unwrap();
        let b = mds.embed(p.view(), &req).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_component_count() {
        let p = potential();
        let req = EmbeddingRequest { n_components: 5, ..request(MdsMethod::Classic) };
        assert_eq!(
            Mds::default().embed(p.view(), &req),
            Err(PhateError::InvalidComponents(5))
        );
    }

    #[test]
    fn closures_are_embedders() {
        let zeros = |p: ArrayView2<'_, f64>, r: &EmbeddingRequest| -> Result<Array2<f64>, PhateError> {
            Ok(Array2::zeros((p.nrows(), r.n_components)))
        };
        let y = zeros.embed(potential().view(), &request(MdsMethod::Metric)).unwrap();
        assert_eq!(y.dim(), (5, 2));
    }

    #[test]
    fn n_jobs_resolution() {
        assert_eq!(resolve_n_jobs(3), 3);
        assert_eq!(resolve_n_jobs(0), 1);
        assert!(resolve_n_jobs(-1) >= 1);
        assert_eq!(resolve_n_jobs(-10_000), 1);
    }
}

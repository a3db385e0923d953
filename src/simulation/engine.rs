//! Monte Carlo threshold estimation engine.
//!
//! Draws `sims` samples from a [`SamplingModel`] and reports the fraction that
//! land strictly above the threshold: P̂(X > t) = #{x_i > t} / sims.
//!
//! ## Execution
//!
//! A run is split into chunks of `chunk_size` draws. Chunk `i` owns a
//! `SmallRng` seeded with [`stream_seed`]`(base_seed, i)`, so a seeded run is
//! reproducible and gives the same count serially or on the rayon pool. Each
//! chunk polls its [`CancelToken`] every `cancel_check_interval` draws.
//!
//! Validation happens before the first draw; once sampling starts the run
//! either completes or is cancelled.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use rayon::prelude::*;
use std::time::Instant;
use tracing::debug;

use crate::constants::{DEFAULT_CANCEL_CHECK_INTERVAL, DEFAULT_CHUNK_SIZE, PARALLEL_MIN_SIMS};
use crate::error::{EstimateError, EstimateResult};
use crate::types::{DistributionParameters, EstimationResult, SamplingModel, SimulationRequest};

use super::cancel::CancelToken;
use super::fast_prng::stream_seed;

/// Knobs for one [`Estimator`].
#[derive(Clone, Debug)]
pub struct EstimatorConfig {
    /// Base seed. `None` draws a fresh seed from OS-seeded entropy per run.
    pub seed: Option<u64>,
    pub chunk_size: u64,
    pub cancel_check_interval: u64,
    /// Run chunks on the rayon pool when the run is large enough.
    pub parallel: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            cancel_check_interval: DEFAULT_CANCEL_CHECK_INTERVAL,
            parallel: true,
        }
    }
}

/// Stateless estimator; the config is the only thing it holds.
#[derive(Clone, Debug, Default)]
pub struct Estimator {
    config: EstimatorConfig,
}

/// Per-run sampler built once from a validated model.
enum Sampler<'a> {
    Normal(Normal<f64>),
    Poisson(Poisson<f64>),
    Empirical(&'a [f64]),
}

impl<'a> Sampler<'a> {
    fn from_model(model: &'a SamplingModel) -> EstimateResult<Self> {
        match model {
            SamplingModel::Normal(p) => Normal::new(p.mu, p.sigma)
                .map(Sampler::Normal)
                .map_err(|e| EstimateError::invalid(format!("normal distribution: {e}"))),
            SamplingModel::Poisson { lambda } => Poisson::new(*lambda)
                .map(Sampler::Poisson)
                .map_err(|e| EstimateError::invalid(format!("poisson distribution: {e}"))),
            SamplingModel::Empirical { values } => Ok(Sampler::Empirical(values)),
        }
    }

    #[inline(always)]
    fn draw(&self, rng: &mut SmallRng) -> f64 {
        match self {
            Sampler::Normal(d) => d.sample(rng),
            Sampler::Poisson(d) => d.sample(rng),
            Sampler::Empirical(values) => values[rng.random_range(0..values.len())],
        }
    }
}

impl Estimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(EstimatorConfig {
            seed: Some(seed),
            ..EstimatorConfig::default()
        })
    }

    /// Run to completion.
    pub fn run(
        &self,
        model: &SamplingModel,
        request: &SimulationRequest,
    ) -> EstimateResult<EstimationResult> {
        match self.run_cancellable(model, request, &CancelToken::new())? {
            Some(result) => Ok(result),
            None => unreachable!("a token nobody else holds is never cancelled"),
        }
    }

    /// Run until done or until `cancel` fires. `Ok(None)` means cancelled;
    /// partial counts are discarded.
    pub fn run_cancellable(
        &self,
        model: &SamplingModel,
        request: &SimulationRequest,
        cancel: &CancelToken,
    ) -> EstimateResult<Option<EstimationResult>> {
        model.validate()?;
        request.validate()?;

        if cancel.is_cancelled() {
            return Ok(None);
        }

        let start = Instant::now();
        let sims = request.sims;
        let threshold = request.threshold;

        let hits = if let Some(value) = model.point_mass() {
            Some(if value > threshold { sims } else { 0 })
        } else {
            let sampler = Sampler::from_model(model)?;
            let seed = self.config.seed.unwrap_or_else(rand::random::<u64>);
            self.count_hits(&sampler, threshold, sims, seed, cancel)
        };

        let Some(hits) = hits else {
            debug!(
                model = model.name(),
                sims,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "estimation cancelled"
            );
            return Ok(None);
        };

        let result = EstimationResult::from_counts(hits, sims);
        debug!(
            model = model.name(),
            threshold,
            sims,
            hits,
            probability = result.probability,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "estimation complete"
        );
        Ok(Some(result))
    }

    fn count_hits(
        &self,
        sampler: &Sampler<'_>,
        threshold: f64,
        sims: u64,
        seed: u64,
        cancel: &CancelToken,
    ) -> Option<u64> {
        let chunk_size = self.config.chunk_size.max(1);
        let interval = self.config.cancel_check_interval.max(1);
        let num_chunks = sims.div_ceil(chunk_size);

        let run_chunk = |chunk: u64| {
            let len = chunk_size.min(sims - chunk * chunk_size);
            let mut rng = SmallRng::seed_from_u64(stream_seed(seed, chunk));
            count_chunk(sampler, &mut rng, threshold, len, interval, cancel)
        };

        if self.config.parallel && sims >= PARALLEL_MIN_SIMS {
            (0..num_chunks)
                .into_par_iter()
                .map(run_chunk)
                .try_reduce(|| 0, |a, b| Some(a + b))
        } else {
            (0..num_chunks).map(run_chunk).sum()
        }
    }
}

/// Count draws above `threshold` in one chunk. `None` if cancelled mid-chunk.
fn count_chunk(
    sampler: &Sampler<'_>,
    rng: &mut SmallRng,
    threshold: f64,
    len: u64,
    interval: u64,
    cancel: &CancelToken,
) -> Option<u64> {
    let mut hits = 0u64;
    let mut done = 0u64;
    while done < len {
        if cancel.is_cancelled() {
            return None;
        }
        let block = interval.min(len - done);
        for _ in 0..block {
            if sampler.draw(rng) > threshold {
                hits += 1;
            }
        }
        done += block;
    }
    Some(hits)
}

/// Estimate P(X > threshold) for X ~ N(mu, sigma) from `sims` draws.
///
/// Seeds a fresh generator per call. Fails with `InvalidArgument` when
/// `sigma < 0`, `sims == 0`, or any float argument is NaN/∞.
pub fn estimate(mu: f64, sigma: f64, threshold: f64, sims: u64) -> EstimateResult<f64> {
    estimate_with(&Estimator::default(), mu, sigma, threshold, sims)
}

/// [`estimate`] with an explicit seed; identical inputs give identical output.
pub fn estimate_seeded(
    mu: f64,
    sigma: f64,
    threshold: f64,
    sims: u64,
    seed: u64,
) -> EstimateResult<f64> {
    estimate_with(&Estimator::with_seed(seed), mu, sigma, threshold, sims)
}

fn estimate_with(
    estimator: &Estimator,
    mu: f64,
    sigma: f64,
    threshold: f64,
    sims: u64,
) -> EstimateResult<f64> {
    let model = SamplingModel::Normal(DistributionParameters::new(mu, sigma)?);
    let request = SimulationRequest::new(threshold, sims)?;
    Ok(estimator.run(&model, &request)?.probability)
}

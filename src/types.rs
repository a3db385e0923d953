//! Value objects passed into and returned from the estimator.
//!
//! All of them are transient: built per call, validated at the boundary and
//! dropped once the estimate is produced. They derive serde traits so the
//! HTTP and CLI surfaces can carry them as JSON unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::POISSON_MIN_LAMBDA;
use crate::error::{require_finite, EstimateError, EstimateResult};
use crate::simulation::statistics::{confidence_interval, standard_error};

/// Normal distribution N(μ, σ).
///
/// σ = 0 is a valid point mass at μ.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionParameters {
    pub mu: f64,
    pub sigma: f64,
}

impl DistributionParameters {
    pub fn new(mu: f64, sigma: f64) -> EstimateResult<Self> {
        let params = Self { mu, sigma };
        params.validate()?;
        Ok(params)
    }

    /// Checks the invariants; deserialized values skip `new`, so the
    /// estimator calls this again before sampling.
    pub fn validate(&self) -> EstimateResult<()> {
        require_finite("mu", self.mu)?;
        require_finite("sigma", self.sigma)?;
        if self.sigma < 0.0 {
            return Err(EstimateError::invalid(format!(
                "sigma must be non-negative, got {}",
                self.sigma
            )));
        }
        Ok(())
    }

    pub fn is_point_mass(&self) -> bool {
        self.sigma == 0.0
    }
}

/// Threshold and number of draws for one run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub threshold: f64,
    pub sims: u64,
}

impl SimulationRequest {
    pub fn new(threshold: f64, sims: u64) -> EstimateResult<Self> {
        let request = Self { threshold, sims };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> EstimateResult<()> {
        require_finite("threshold", self.threshold)?;
        if self.sims == 0 {
            return Err(EstimateError::invalid("sims must be at least 1"));
        }
        Ok(())
    }
}

/// Two-sided 95% interval around an estimated probability, clamped to [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Outcome of a completed run: P̂(X > threshold) = hits / sims.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstimationResult {
    pub probability: f64,
    /// Draws strictly above the threshold.
    pub hits: u64,
    pub sims: u64,
    pub standard_error: f64,
    pub confidence: ConfidenceInterval,
}

impl EstimationResult {
    /// Build from raw counts. `sims` must be non-zero; callers validate first.
    pub fn from_counts(hits: u64, sims: u64) -> Self {
        let probability = hits as f64 / sims as f64;
        Self {
            probability,
            hits,
            sims,
            standard_error: standard_error(probability, sims),
            confidence: confidence_interval(probability, sims),
        }
    }
}

/// Parametric family selector used when a model is built from a mean or a history.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    #[default]
    Normal,
    Poisson,
}

impl FromStr for Distribution {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Distribution::Normal),
            "poisson" => Ok(Distribution::Poisson),
            other => Err(EstimateError::invalid(format!(
                "unknown distribution '{other}' (expected normal or poisson)"
            ))),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Normal => write!(f, "normal"),
            Distribution::Poisson => write!(f, "poisson"),
        }
    }
}

/// What each draw is sampled from.
///
/// - `Normal`: N(μ, σ) via the ziggurat sampler.
/// - `Poisson`: integer counts with rate λ.
/// - `Empirical`: bootstrap, one observed value picked uniformly with replacement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SamplingModel {
    Normal(DistributionParameters),
    Poisson { lambda: f64 },
    Empirical { values: Vec<f64> },
}

impl SamplingModel {
    pub fn normal(mu: f64, sigma: f64) -> EstimateResult<Self> {
        Ok(SamplingModel::Normal(DistributionParameters::new(mu, sigma)?))
    }

    /// Poisson with λ = max(mean, 0.5).
    pub fn poisson_from_mean(mean: f64) -> EstimateResult<Self> {
        let mean = require_finite("mean", mean)?;
        Ok(SamplingModel::Poisson {
            lambda: mean.max(POISSON_MIN_LAMBDA),
        })
    }

    pub fn empirical(values: Vec<f64>) -> EstimateResult<Self> {
        let model = SamplingModel::Empirical { values };
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> EstimateResult<()> {
        match self {
            SamplingModel::Normal(params) => params.validate(),
            SamplingModel::Poisson { lambda } => {
                require_finite("lambda", *lambda)?;
                if *lambda <= 0.0 {
                    return Err(EstimateError::invalid(format!(
                        "lambda must be positive, got {lambda}"
                    )));
                }
                Ok(())
            }
            SamplingModel::Empirical { values } => {
                if values.is_empty() {
                    return Err(EstimateError::invalid(
                        "empirical history must contain at least one value",
                    ));
                }
                for &v in values {
                    require_finite("history value", v)?;
                }
                Ok(())
            }
        }
    }

    /// The single value every draw takes, when the model is degenerate.
    pub fn point_mass(&self) -> Option<f64> {
        match self {
            SamplingModel::Normal(params) if params.is_point_mass() => Some(params.mu),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SamplingModel::Normal(_) => "normal",
            SamplingModel::Poisson { .. } => "poisson",
            SamplingModel::Empirical { .. } => "empirical",
        }
    }
}

//! Fit sampling models from an observation history.
//!
//! Only the most recent [`MAX_HISTORY_POINTS`] values are used (the tail of
//! the slice is the most recent). A fitted σ below [`MIN_FITTED_SIGMA`] is
//! replaced by [`SIGMA_FLOOR`] so a flat history still produces spread.

use tracing::debug;

use crate::constants::{MAX_HISTORY_POINTS, MIN_FITTED_SIGMA, SIGMA_FLOOR};
use crate::error::EstimateResult;
use crate::simulation::statistics::summarize;
use crate::types::{Distribution, DistributionParameters, SamplingModel};

/// Most recent window of a history.
pub fn recent_window(points: &[f64]) -> &[f64] {
    let start = points.len().saturating_sub(MAX_HISTORY_POINTS);
    &points[start..]
}

/// Normal fit: sample mean and sample standard deviation (n - 1).
pub fn fit_normal(points: &[f64]) -> EstimateResult<DistributionParameters> {
    let window = recent_window(points);
    let summary = summarize(window)?;
    let sigma = if summary.std_dev < MIN_FITTED_SIGMA {
        SIGMA_FLOOR
    } else {
        summary.std_dev
    };
    debug!(
        points = window.len(),
        mu = summary.mean,
        sigma,
        "fitted normal from history"
    );
    DistributionParameters::new(summary.mean, sigma)
}

impl SamplingModel {
    /// Parametric model for a history: Normal from [`fit_normal`], or Poisson
    /// with λ = max(mean, 0.5).
    pub fn from_history(points: &[f64], distribution: Distribution) -> EstimateResult<Self> {
        match distribution {
            Distribution::Normal => Ok(SamplingModel::Normal(fit_normal(points)?)),
            Distribution::Poisson => {
                let summary = summarize(recent_window(points))?;
                SamplingModel::poisson_from_mean(summary.mean)
            }
        }
    }

    /// Bootstrap model over the recent window.
    pub fn bootstrap(points: &[f64]) -> EstimateResult<Self> {
        SamplingModel::empirical(recent_window(points).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_window_keeps_tail() {
        let points: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let w = recent_window(&points);
        assert_eq!(w.len(), MAX_HISTORY_POINTS);
        assert_eq!(w[0], 40.0);
        assert_eq!(w[w.len() - 1], 99.0);
        assert_eq!(recent_window(&[1.0, 2.0]).len(), 2);
    }

    #[test]
    fn test_fit_normal() {
        let p = fit_normal(&[20.0, 24.0, 28.0]).unwrap();
        assert_eq!(p.mu, 24.0);
        assert!((p.sigma - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_normal_sigma_floor() {
        let flat = fit_normal(&[18.0, 18.0, 18.0]).unwrap();
        assert_eq!(flat.sigma, SIGMA_FLOOR);
        let single = fit_normal(&[31.0]).unwrap();
        assert_eq!(single.mu, 31.0);
        assert_eq!(single.sigma, SIGMA_FLOOR);
    }

    #[test]
    fn test_fit_normal_large_values() {
        let p = fit_normal(&[1e200, -1e200]).unwrap();
        assert_eq!(p.mu, 0.0);
        assert!(p.sigma.is_finite() && p.sigma > 1e200);
    }

    #[test]
    fn test_fit_uses_recent_window_only() {
        let mut points = vec![1000.0; 10];
        points.extend(std::iter::repeat(10.0).take(MAX_HISTORY_POINTS));
        let p = fit_normal(&points).unwrap();
        assert_eq!(p.mu, 10.0);
    }

    #[test]
    fn test_from_history() {
        let points = [0.0, 0.2, 0.4];
        match SamplingModel::from_history(&points, Distribution::Poisson).unwrap() {
            SamplingModel::Poisson { lambda } => assert_eq!(lambda, 0.5),
            other => panic!("expected poisson, got {other:?}"),
        }
        assert!(matches!(
            SamplingModel::from_history(&points, Distribution::Normal).unwrap(),
            SamplingModel::Normal(_)
        ));
        assert!(SamplingModel::from_history(&[], Distribution::Normal).is_err());
        assert!(SamplingModel::bootstrap(&[]).is_err());
    }
}

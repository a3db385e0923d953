//! Closed-form tail probabilities via `statrs`.
//!
//! Used as the reference the Monte Carlo estimate converges to, and as the
//! analytic half of [`crate::report::threshold_report`]. Same strict
//! convention as the estimator: P(X > threshold).

use statrs::distribution::{ContinuousCDF, DiscreteCDF, Normal, Poisson};

use crate::error::{require_finite, EstimateError, EstimateResult};
use crate::types::{DistributionParameters, SamplingModel};

/// P(X > threshold) for X ~ N(mu, sigma). σ = 0 is a point mass at μ.
pub fn normal_tail(mu: f64, sigma: f64, threshold: f64) -> EstimateResult<f64> {
    let params = DistributionParameters::new(mu, sigma)?;
    require_finite("threshold", threshold)?;

    if params.is_point_mass() {
        return Ok(if mu > threshold { 1.0 } else { 0.0 });
    }
    let dist = Normal::new(mu, sigma)
        .map_err(|e| EstimateError::invalid(format!("normal distribution: {e}")))?;
    Ok(dist.sf(threshold))
}

/// P(X > threshold) for X ~ Poisson(lambda), i.e. 1 - CDF(⌊threshold⌋).
pub fn poisson_tail(lambda: f64, threshold: f64) -> EstimateResult<f64> {
    SamplingModel::Poisson { lambda }.validate()?;
    require_finite("threshold", threshold)?;

    if threshold < 0.0 {
        return Ok(1.0);
    }
    let dist = Poisson::new(lambda)
        .map_err(|e| EstimateError::invalid(format!("poisson distribution: {e}")))?;
    Ok(dist.sf(threshold.floor() as u64))
}

/// Exact tail for the parametric models; the empirical model's tail is the
/// plain fraction of observed values above the threshold.
pub fn model_tail(model: &SamplingModel, threshold: f64) -> EstimateResult<f64> {
    match model {
        SamplingModel::Normal(p) => normal_tail(p.mu, p.sigma, threshold),
        SamplingModel::Poisson { lambda } => poisson_tail(*lambda, threshold),
        SamplingModel::Empirical { values } => {
            model.validate()?;
            require_finite("threshold", threshold)?;
            let above = values.iter().filter(|&&v| v > threshold).count();
            Ok(above as f64 / values.len() as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_tail_symmetry() {
        assert!((normal_tail(0.0, 1.0, 0.0).unwrap() - 0.5).abs() < 1e-12);
        // P(Z > 1.96) ≈ 0.025
        assert!((normal_tail(0.0, 1.0, 1.96).unwrap() - 0.0249979).abs() < 1e-6);
        let lo = normal_tail(10.0, 2.0, 8.0).unwrap();
        let hi = normal_tail(10.0, 2.0, 12.0).unwrap();
        assert!((lo + hi - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normal_tail_point_mass() {
        assert_eq!(normal_tail(10.0, 0.0, 5.0).unwrap(), 1.0);
        assert_eq!(normal_tail(5.0, 0.0, 5.0).unwrap(), 0.0);
    }

    #[test]
    fn test_normal_tail_rejects_bad_input() {
        assert!(normal_tail(0.0, -1.0, 0.0).is_err());
        assert!(normal_tail(0.0, 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_poisson_tail() {
        // P(X > 4 | λ=4) = 1 - 0.62884
        assert!((poisson_tail(4.0, 4.0).unwrap() - 0.371163).abs() < 1e-5);
        // Fractional threshold: X > 4.5 is the same event as X > 4.
        assert_eq!(poisson_tail(4.0, 4.5).unwrap(), poisson_tail(4.0, 4.0).unwrap());
        assert_eq!(poisson_tail(4.0, -0.5).unwrap(), 1.0);
        assert!(poisson_tail(0.0, 1.0).is_err());
    }

    #[test]
    fn test_model_tail_empirical() {
        let model = SamplingModel::empirical(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(model_tail(&model, 2.0).unwrap(), 0.5);
        assert_eq!(model_tail(&model, 4.0).unwrap(), 0.0);
    }
}

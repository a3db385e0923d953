//! Threshold report: closed-form and Monte Carlo views of the same question.
//!
//! Given a history of observations and a line, computes
//!
//! | Field | Source |
//! |-------|--------|
//! | `poisson_probability` | [`poisson_tail`] with λ = max(season mean, 0.5); skipped for a mean <= 0 |
//! | `monte_carlo_probability` | bootstrap estimate over the recent window |
//! | `blended_probability` | [`blend_default`] of the two (60% Monte Carlo) |
//! | `confidence` | 95% interval of the blend for `sims` draws |
//! | `recommendation` | [`Recommendation::from_probability`] of the blend |
//!
//! Either source may be missing; the blend falls back to whichever exists.

use serde::Serialize;

use crate::analytic::poisson_tail;
use crate::constants::{POISSON_MIN_LAMBDA, RECOMMEND_THRESHOLD};
use crate::error::{require_finite, EstimateResult};
use crate::history::recent_window;
use crate::simulation::cancel::CancelToken;
use crate::simulation::engine::Estimator;
use crate::simulation::statistics::{blend_default, confidence_interval, summarize, HistorySummary};
use crate::types::{ConfidenceInterval, SamplingModel, SimulationRequest};

/// Verdict on the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Recommendation {
    LeanOver,
    StayAway,
}

impl Recommendation {
    /// `LeanOver` only when `p` is strictly above [`RECOMMEND_THRESHOLD`].
    pub fn from_probability(p: f64) -> Self {
        if p > RECOMMEND_THRESHOLD {
            Recommendation::LeanOver
        } else {
            Recommendation::StayAway
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThresholdReport {
    pub threshold: f64,
    pub sims: u64,
    pub poisson_probability: Option<f64>,
    pub monte_carlo_probability: Option<f64>,
    pub blended_probability: Option<f64>,
    pub confidence: Option<ConfidenceInterval>,
    pub recommendation: Option<Recommendation>,
    pub history: Option<HistorySummary>,
}

pub fn threshold_report(
    estimator: &Estimator,
    points: &[f64],
    threshold: f64,
    season_mean: Option<f64>,
    sims: u64,
) -> EstimateResult<ThresholdReport> {
    let report = threshold_report_cancellable(
        estimator,
        points,
        threshold,
        season_mean,
        sims,
        &CancelToken::new(),
    )?;
    match report {
        Some(report) => Ok(report),
        None => unreachable!("a token nobody else holds is never cancelled"),
    }
}

/// [`threshold_report`] that stops sampling when `cancel` fires (`Ok(None)`).
pub fn threshold_report_cancellable(
    estimator: &Estimator,
    points: &[f64],
    threshold: f64,
    season_mean: Option<f64>,
    sims: u64,
    cancel: &CancelToken,
) -> EstimateResult<Option<ThresholdReport>> {
    let request = SimulationRequest::new(threshold, sims)?;

    let poisson_probability = match season_mean {
        Some(mean) if require_finite("season_mean", mean)? > 0.0 => {
            Some(poisson_tail(mean.max(POISSON_MIN_LAMBDA), threshold)?)
        }
        _ => None,
    };

    let (monte_carlo_probability, history) = if points.is_empty() {
        (None, None)
    } else {
        let model = SamplingModel::bootstrap(points)?;
        let Some(result) = estimator.run_cancellable(&model, &request, cancel)? else {
            return Ok(None);
        };
        (Some(result.probability), Some(summarize(recent_window(points))?))
    };

    let blended_probability = blend_default(monte_carlo_probability, poisson_probability);
    let confidence = blended_probability.map(|p| confidence_interval(p, sims));
    let recommendation = blended_probability.map(Recommendation::from_probability);

    Ok(Some(ThresholdReport {
        threshold,
        sims,
        poisson_probability,
        monte_carlo_probability,
        blended_probability,
        confidence,
        recommendation,
        history,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_both_sources() {
        let est = Estimator::with_seed(5);
        let points = [30.0, 12.0, 25.0, 28.0, 19.0];
        let r = threshold_report(&est, &points, 22.5, Some(24.0), 20_000).unwrap();

        let mc = r.monte_carlo_probability.unwrap();
        assert!((mc - 0.6).abs() < 0.02, "mc={mc}");
        let pois = r.poisson_probability.unwrap();
        let blended = r.blended_probability.unwrap();
        assert!((blended - (0.6 * mc + 0.4 * pois)).abs() < 1e-12);
        let ci = r.confidence.unwrap();
        assert!(ci.lower <= blended && blended <= ci.upper);
        assert_eq!(r.history.unwrap().count, 5);
    }

    #[test]
    fn test_report_no_sources() {
        let est = Estimator::with_seed(5);
        let r = threshold_report(&est, &[], 10.0, None, 1000).unwrap();
        assert_eq!(r.blended_probability, None);
        assert_eq!(r.confidence, None);
        assert_eq!(r.recommendation, None);
    }

    #[test]
    fn test_recommendation_boundary() {
        assert_eq!(Recommendation::from_probability(0.55), Recommendation::StayAway);
        assert_eq!(Recommendation::from_probability(0.5500001), Recommendation::LeanOver);
        assert_eq!(Recommendation::from_probability(0.1), Recommendation::StayAway);
        assert_eq!(
            serde_json::to_value(Recommendation::LeanOver).unwrap(),
            "leanOver"
        );
    }

    #[test]
    fn test_report_recommendation_follows_blend() {
        let est = Estimator::with_seed(5);
        // Every observation above the line: blend is 1.0.
        let r = threshold_report(&est, &[30.0, 31.0, 29.0], 10.0, None, 1000).unwrap();
        assert_eq!(r.recommendation, Some(Recommendation::LeanOver));
        let r = threshold_report(&est, &[3.0, 4.0, 2.0], 10.0, None, 1000).unwrap();
        assert_eq!(r.recommendation, Some(Recommendation::StayAway));
    }

    #[test]
    fn test_report_skips_non_positive_season_mean() {
        let est = Estimator::with_seed(5);
        for mean in [0.0, -3.0] {
            let r = threshold_report(&est, &[], 4.0, Some(mean), 1000).unwrap();
            assert_eq!(r.poisson_probability, None, "mean={mean}");
            assert_eq!(r.blended_probability, None);
        }
    }

    #[test]
    fn test_report_cancelled() {
        let est = Estimator::with_seed(5);
        let token = CancelToken::new();
        token.cancel();
        let r = threshold_report_cancellable(&est, &[1.0, 2.0], 1.5, Some(2.0), 1000, &token)
            .unwrap();
        assert!(r.is_none());
    }

    #[test]
    fn test_report_analytic_only() {
        let est = Estimator::with_seed(5);
        let r = threshold_report(&est, &[], 4.0, Some(4.0), 1000).unwrap();
        assert_eq!(r.monte_carlo_probability, None);
        assert_eq!(r.blended_probability, r.poisson_probability);
    }

    #[test]
    fn test_report_rejects_bad_numbers() {
        let est = Estimator::with_seed(5);
        assert!(threshold_report(&est, &[1.0], f64::NAN, None, 100).is_err());
        assert!(threshold_report(&est, &[1.0], 1.0, Some(f64::INFINITY), 100).is_err());
        assert!(threshold_report(&est, &[1.0], 1.0, None, 0).is_err());
    }
}

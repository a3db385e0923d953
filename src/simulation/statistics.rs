//! Statistics over estimates and observation histories.
//!
//! - [`standard_error`] / [`confidence_interval`]: binomial error of a hit fraction
//! - [`blend`]: weighted mix of a Monte Carlo and a closed-form tail
//! - [`summarize`]: mean/spread/order statistics of a history

use serde::Serialize;

use crate::constants::{MC_BLEND_WEIGHT, Z_95};
use crate::error::{require_finite, EstimateError, EstimateResult};
use crate::types::ConfidenceInterval;

/// sqrt(p(1-p)/n). Returns 0 for n = 0 instead of NaN.
pub fn standard_error(p: f64, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let var = (p * (1.0 - p)).max(0.0) / n as f64;
    var.sqrt()
}

/// Normal-approximation 95% interval p ± 1.96·se, clamped to [0, 1].
pub fn confidence_interval(p: f64, n: u64) -> ConfidenceInterval {
    let half = Z_95 * standard_error(p, n);
    ConfidenceInterval {
        lower: (p - half).max(0.0),
        upper: (p + half).min(1.0),
    }
}

/// Weighted mix `w·mc + (1-w)·analytic`; falls back to whichever side is present.
pub fn blend(mc: Option<f64>, analytic: Option<f64>, mc_weight: f64) -> Option<f64> {
    match (mc, analytic) {
        (Some(m), Some(a)) => Some(mc_weight * m + (1.0 - mc_weight) * a),
        (Some(m), None) => Some(m),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

/// [`blend`] with the default Monte Carlo weight.
pub fn blend_default(mc: Option<f64>, analytic: Option<f64>) -> Option<f64> {
    blend(mc, analytic, MC_BLEND_WEIGHT)
}

// ── History summary ─────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistorySummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator); 0 for a single point.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
}

pub fn summarize(values: &[f64]) -> EstimateResult<HistorySummary> {
    if values.is_empty() {
        return Err(EstimateError::invalid("history must not be empty"));
    }
    for &v in values {
        require_finite("history value", v)?;
    }

    // Deviations are taken on values scaled by max |v| so sums of squares of
    // large finite inputs stay finite.
    let n = values.len();
    let scale = values.iter().fold(0.0f64, |m, &v| m.max(v.abs()));
    let mut mean = values.iter().sum::<f64>() / n as f64;
    if !mean.is_finite() {
        mean = scale * (values.iter().map(|&v| v / scale).sum::<f64>() / n as f64);
    }
    let std_dev = if n > 1 && scale > 0.0 {
        let scaled_mean = mean / scale;
        let ss: f64 = values
            .iter()
            .map(|&v| (v / scale - scaled_mean).powi(2))
            .sum();
        scale * (ss / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        sorted[n / 2 - 1] / 2.0 + sorted[n / 2] / 2.0
    };

    Ok(HistorySummary {
        count: n,
        mean,
        std_dev,
        min: sorted[0],
        max: sorted[n - 1],
        median,
    })
}

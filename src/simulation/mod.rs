//! Monte Carlo sampling and estimate statistics.
//!
//! - [`engine`]: Core estimator (draw N samples, count those above the threshold)
//! - [`fast_prng`]: SplitMix64 seed mixing for per-chunk RNG streams
//! - [`cancel`]: Cooperative cancellation token
//! - [`statistics`]: Standard errors, intervals, blending and history summaries

pub mod cancel;
pub mod engine;
pub mod fast_prng;
pub mod statistics;

// Re-export commonly used items
pub use cancel::{CancelGuard, CancelToken};
pub use engine::{estimate, estimate_seeded, Estimator, EstimatorConfig};
pub use statistics::{blend, blend_default, confidence_interval, standard_error, summarize, HistorySummary};

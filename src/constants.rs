//! Estimator constants: sampling defaults, fitting floors, interval widths.
//!
//! Values that shape the numeric contract live here so the estimator, the
//! fitting code and the HTTP/CLI surfaces agree on them.

/// Default number of draws when a caller does not specify `sims`.
pub const DEFAULT_SIMS: u64 = 100_000;

/// Largest `sims` the HTTP service accepts unless configured otherwise.
pub const DEFAULT_MAX_SIMS: u64 = 50_000_000;

/// Draws per work unit. Each chunk owns one RNG stream, so a seeded run gives
/// the same answer whether chunks run serially or on the rayon pool.
pub const DEFAULT_CHUNK_SIZE: u64 = 1 << 16;

/// How many draws a chunk takes between polls of the cancellation flag.
pub const DEFAULT_CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Runs below this many draws are not worth splitting across threads.
pub const PARALLEL_MIN_SIMS: u64 = 4 * DEFAULT_CHUNK_SIZE;

/// Number of most recent observations kept when fitting from history.
pub const MAX_HISTORY_POINTS: usize = 60;

/// Fitted standard deviations below this are treated as degenerate.
pub const MIN_FITTED_SIGMA: f64 = 1e-4;

/// Replacement σ for a degenerate fit (constant or single-point history).
pub const SIGMA_FLOOR: f64 = 0.5;

/// Smallest Poisson rate accepted when deriving λ from a mean.
pub const POISSON_MIN_LAMBDA: f64 = 0.5;

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// Weight of the Monte Carlo estimate when blended with a closed-form tail.
pub const MC_BLEND_WEIGHT: f64 = 0.6;

/// Blended probabilities strictly above this are a "lean over" verdict.
pub const RECOMMEND_THRESHOLD: f64 = 0.55;

//! # tailprob — Monte Carlo threshold estimation
//!
//! Estimates P(X > t) by drawing `sims` samples and counting those strictly
//! above the threshold `t`:
//!
//! ```text
//! P̂(X > t) = #{ i : x_i > t } / sims
//! ```
//!
//! ```no_run
//! let p = tailprob::estimate(0.0, 1.0, 0.0, 1_000_000)?;
//! assert!((p - 0.5).abs() < 0.01);
//! # Ok::<(), tailprob::EstimateError>(())
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`simulation`] | Seeded, chunked, optionally parallel sampling engine |
//! | [`types`] | Distribution parameters, requests, results, sampling models |
//! | [`history`] | Fit normal/Poisson/bootstrap models from observed values |
//! | [`analytic`] | Closed-form tails used as convergence references |
//! | [`report`] | Poisson + bootstrap report with a blended probability |
//! | [`server`] | Axum HTTP endpoints |
//! | [`env_config`] | Environment-driven settings for the binaries |
//!
//! ## Conventions
//!
//! - **Tail direction**: always the upper tail with a strict comparison; a
//!   draw equal to the threshold is not a hit.
//! - **σ = 0**: point mass, answered exactly (1.0 or 0.0) without sampling.
//! - **Errors**: malformed input fails with [`EstimateError::InvalidArgument`]
//!   before any draw is made.
//! - **Randomness**: no global generator. Each run derives one `SmallRng` per
//!   chunk from an injected seed, or from fresh entropy when none is given.

pub mod analytic;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod history;
pub mod report;
pub mod server;
pub mod simulation;
pub mod types;

pub use error::{EstimateError, EstimateResult};
pub use simulation::{estimate, estimate_seeded, CancelToken, Estimator, EstimatorConfig};
pub use types::{
    ConfidenceInterval, Distribution, DistributionParameters, EstimationResult, SamplingModel,
    SimulationRequest,
};

//! Shared environment configuration for the tailprob binaries.
//!
//! Consolidates `TAILPROB_LOG`, `RAYON_NUM_THREADS`, `TAILPROB_PORT`,
//! `TAILPROB_DEFAULT_SIMS` and `TAILPROB_MAX_SIMS` reads. The library itself
//! never reads the environment; callers pass what they need explicitly.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_MAX_SIMS, DEFAULT_SIMS};

/// Install the fmt subscriber, filtered by `TAILPROB_LOG` (default `info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("TAILPROB_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8).
/// Builds the rayon global pool, tolerating one that already exists.
/// Returns thread count.
pub fn init_rayon_threads() -> usize {
    let num_threads = std::env::var("RAYON_NUM_THREADS")
        .or_else(|_| std::env::var("OMP_NUM_THREADS"))
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok(); // May fail if already initialized
    info!(num_threads, "rayon pool ready");
    num_threads
}

/// Read `TAILPROB_PORT` (default 9100).
pub fn server_port() -> u16 {
    std::env::var("TAILPROB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9100)
}

/// Read `TAILPROB_DEFAULT_SIMS` (default [`DEFAULT_SIMS`]). Zero is ignored.
pub fn default_sims() -> u64 {
    std::env::var("TAILPROB_DEFAULT_SIMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&n: &u64| n > 0)
        .unwrap_or(DEFAULT_SIMS)
}

/// Read `TAILPROB_MAX_SIMS` (default [`DEFAULT_MAX_SIMS`]). Zero is ignored.
pub fn max_sims() -> u64 {
    std::env::var("TAILPROB_MAX_SIMS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&n: &u64| n > 0)
        .unwrap_or(DEFAULT_MAX_SIMS)
}

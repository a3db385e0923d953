//! Property-based tests for the estimator contract.

use proptest::prelude::*;

use tailprob::analytic::normal_tail;
use tailprob::{estimate_seeded, EstimateError};

/// Strategy: finite location-like value.
fn finite_strategy() -> impl Strategy<Value = f64> {
    -1e6..1e6f64
}

/// Strategy: valid standard deviation, including the point mass.
fn sigma_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), 1e-6..1e4f64]
}

proptest! {
    // 1. Estimates always lie in [0, 1]
    #[test]
    fn estimate_in_unit_interval(
        mu in finite_strategy(),
        sigma in sigma_strategy(),
        threshold in finite_strategy(),
        sims in 1..2_000u64,
        seed in any::<u64>(),
    ) {
        let p = estimate_seeded(mu, sigma, threshold, sims, seed).unwrap();
        prop_assert!((0.0..=1.0).contains(&p), "p={p}");
    }

    // 2. σ = 0 is answered exactly
    #[test]
    fn point_mass_exact(
        mu in finite_strategy(),
        threshold in finite_strategy(),
        sims in 1..10_000u64,
        seed in any::<u64>(),
    ) {
        let p = estimate_seeded(mu, 0.0, threshold, sims, seed).unwrap();
        let expected = if mu > threshold { 1.0 } else { 0.0 };
        prop_assert_eq!(p, expected);
    }

    // 3. Same seed, same answer
    #[test]
    fn seeded_deterministic(
        mu in finite_strategy(),
        sigma in sigma_strategy(),
        threshold in finite_strategy(),
        seed in any::<u64>(),
    ) {
        let a = estimate_seeded(mu, sigma, threshold, 500, seed).unwrap();
        let b = estimate_seeded(mu, sigma, threshold, 500, seed).unwrap();
        prop_assert_eq!(a, b);
    }

    // 4. Negative σ is always rejected
    #[test]
    fn negative_sigma_rejected(
        mu in finite_strategy(),
        sigma in -1e6..-1e-12f64,
        threshold in finite_strategy(),
    ) {
        let err = estimate_seeded(mu, sigma, threshold, 10, 0).unwrap_err();
        let is_invalid = matches!(err, EstimateError::InvalidArgument { .. });
        prop_assert!(is_invalid);
    }

    // 5. Closed-form tail is a probability and decreases in the threshold
    #[test]
    fn normal_tail_monotone(
        mu in -1e3..1e3f64,
        sigma in 1e-3..1e3f64,
        t1 in -1e4..1e4f64,
        t2 in -1e4..1e4f64,
    ) {
        let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        let p_lo = normal_tail(mu, sigma, lo).unwrap();
        let p_hi = normal_tail(mu, sigma, hi).unwrap();
        prop_assert!((0.0..=1.0).contains(&p_lo));
        prop_assert!(p_hi <= p_lo + 1e-12);
    }
}

// 6. Zero draws and non-finite inputs fail before sampling (non-proptest)
#[test]
fn zero_sims_and_non_finite_rejected() {
    assert!(estimate_seeded(0.0, 1.0, 0.0, 0, 1).is_err());
    for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert!(estimate_seeded(bad, 1.0, 0.0, 10, 1).is_err());
        assert!(estimate_seeded(0.0, bad, 0.0, 10, 1).is_err());
        assert!(estimate_seeded(0.0, 1.0, bad, 10, 1).is_err());
    }
}

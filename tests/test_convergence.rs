//! Statistical convergence of the estimator against closed-form tails.
//!
//! Large runs (10^6 draws) on the rayon pool; tolerances are 4 standard
//! errors of the binomial estimate, checked over several fixed seeds.

use tailprob::analytic::{normal_tail, poisson_tail};
use tailprob::simulation::standard_error;
use tailprob::{estimate, estimate_seeded, CancelToken, Estimator, SamplingModel, SimulationRequest};

const SIMS: u64 = 1_000_000;

fn assert_within_4se(p_hat: f64, p_true: f64, sims: u64, label: &str) {
    let se = standard_error(p_true, sims).max(1e-9);
    let z = (p_hat - p_true).abs() / se;
    assert!(
        z < 4.0,
        "{label}: estimate {p_hat:.6} vs exact {p_true:.6} ({z:.2} standard errors)"
    );
}

#[test]
fn standard_normal_median() {
    let p = estimate(0.0, 1.0, 0.0, SIMS).unwrap();
    assert!((p - 0.5).abs() < 0.01, "p={p}");
}

#[test]
fn point_mass_above_threshold() {
    assert_eq!(estimate(10.0, 0.0, 5.0, 100).unwrap(), 1.0);
}

#[test]
fn unreachable_threshold() {
    let p = estimate(0.0, 1.0, 1e9, 1000).unwrap();
    assert_eq!(p, 0.0);
}

#[test]
fn normal_converges_to_exact_tail() {
    let cases = [(0.0, 1.0, 1.0), (25.0, 6.5, 30.5), (-3.0, 0.25, -3.4), (100.0, 40.0, 20.0)];
    for (i, &(mu, sigma, threshold)) in cases.iter().enumerate() {
        let exact = normal_tail(mu, sigma, threshold).unwrap();
        for seed in [11u64, 12, 13] {
            let p = estimate_seeded(mu, sigma, threshold, SIMS, seed + 100 * i as u64).unwrap();
            assert_within_4se(p, exact, SIMS, &format!("N({mu}, {sigma}) > {threshold}"));
        }
    }
}

#[test]
fn poisson_converges_to_exact_tail() {
    for &(lambda, threshold) in &[(4.0, 4.0), (22.3, 25.5), (0.5, 0.0)] {
        let exact = poisson_tail(lambda, threshold).unwrap();
        let model = SamplingModel::Poisson { lambda };
        let request = SimulationRequest::new(threshold, SIMS).unwrap();
        let r = Estimator::with_seed(77).run(&model, &request).unwrap();
        assert_within_4se(r.probability, exact, SIMS, &format!("Poisson({lambda}) > {threshold}"));
    }
}

#[test]
fn interval_covers_exact_tail() {
    let model = SamplingModel::normal(25.0, 6.5).unwrap();
    let request = SimulationRequest::new(30.5, SIMS).unwrap();
    let exact = normal_tail(25.0, 6.5, 30.5).unwrap();
    let r = Estimator::with_seed(2024).run(&model, &request).unwrap();
    assert!(
        r.confidence.lower - 1e-3 <= exact && exact <= r.confidence.upper + 1e-3,
        "interval [{}, {}] vs exact {exact}",
        r.confidence.lower,
        r.confidence.upper
    );
}

#[test]
fn cancellation_from_another_thread() {
    let model = SamplingModel::normal(0.0, 1.0).unwrap();
    let request = SimulationRequest::new(0.0, u64::MAX / 2).unwrap();
    let token = CancelToken::new();
    let trigger = token.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(50));
        trigger.cancel();
    });
    let r = Estimator::with_seed(1)
        .run_cancellable(&model, &request, &token)
        .unwrap();
    handle.join().unwrap();
    assert!(r.is_none());
}

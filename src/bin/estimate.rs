use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use tracing::info;

use tailprob::analytic::model_tail;
use tailprob::env_config;
use tailprob::{CancelToken, Distribution, Estimator, EstimatorConfig, SamplingModel, SimulationRequest};

const USAGE: &str = "Usage: tailprob-estimate --threshold T [--mu M --sigma S | --history a,b,c] [--sims N] [--seed S] [--distribution normal|poisson] [--bootstrap] [--timeout SECS] [--json]";

struct Args {
    mu: Option<f64>,
    sigma: Option<f64>,
    threshold: Option<f64>,
    history: Option<Vec<f64>>,
    sims: u64,
    seed: Option<u64>,
    distribution: Distribution,
    bootstrap: bool,
    timeout: Option<Duration>,
    json: bool,
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> anyhow::Result<T> {
    let raw = value.with_context(|| format!("{flag} needs a value"))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("Invalid {flag} value: {raw}"))
}

fn parse_args() -> anyhow::Result<Args> {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        mu: None,
        sigma: None,
        threshold: None,
        history: None,
        sims: env_config::default_sims(),
        seed: None,
        distribution: Distribution::Normal,
        bootstrap: false,
        timeout: None,
        json: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--mu" => {
                i += 1;
                parsed.mu = Some(parse_value("--mu", args.get(i))?);
            }
            "--sigma" => {
                i += 1;
                parsed.sigma = Some(parse_value("--sigma", args.get(i))?);
            }
            "--threshold" => {
                i += 1;
                parsed.threshold = Some(parse_value("--threshold", args.get(i))?);
            }
            "--sims" => {
                i += 1;
                parsed.sims = parse_value("--sims", args.get(i))?;
            }
            "--seed" => {
                i += 1;
                parsed.seed = Some(parse_value("--seed", args.get(i))?);
            }
            "--distribution" => {
                i += 1;
                parsed.distribution = parse_value("--distribution", args.get(i))?;
            }
            "--history" => {
                i += 1;
                let raw: String = parse_value("--history", args.get(i))?;
                let points = raw
                    .split(',')
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| {
                        s.trim()
                            .parse::<f64>()
                            .with_context(|| format!("Invalid --history entry: {s}"))
                    })
                    .collect::<anyhow::Result<Vec<f64>>>()?;
                parsed.history = Some(points);
            }
            "--timeout" => {
                i += 1;
                let secs: f64 = parse_value("--timeout", args.get(i))?;
                if !(secs.is_finite() && secs > 0.0) {
                    bail!("--timeout must be a positive number of seconds");
                }
                parsed.timeout = Some(Duration::from_secs_f64(secs));
            }
            "--bootstrap" => {
                parsed.bootstrap = true;
            }
            "--json" => {
                parsed.json = true;
            }
            "--help" | "-h" => {
                println!("{USAGE}");
                println!();
                println!("Options:");
                println!("  --threshold T      Count draws strictly above T (required)");
                println!("  --mu M             Mean (normal) or rate (poisson)");
                println!("  --sigma S          Standard deviation, >= 0 (normal only)");
                println!("  --history a,b,c    Fit the model to observed values instead");
                println!("  --bootstrap        With --history: resample observed values directly");
                println!("  --sims N           Number of draws (default: $TAILPROB_DEFAULT_SIMS or 100000)");
                println!("  --seed S           RNG seed (default: fresh entropy)");
                println!("  --distribution D   normal | poisson (default: normal)");
                println!("  --timeout SECS     Cancel the run after SECS seconds");
                println!("  --json             Print the full result as JSON");
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!("{USAGE}");
                std::process::exit(1);
            }
        }
        i += 1;
    }
    Ok(parsed)
}

fn build_model(args: &Args) -> anyhow::Result<SamplingModel> {
    let model = match (&args.history, args.mu) {
        (Some(points), None) if args.bootstrap => SamplingModel::bootstrap(points)?,
        (Some(points), None) => SamplingModel::from_history(points, args.distribution)?,
        (None, Some(mu)) => match args.distribution {
            Distribution::Normal => {
                let sigma = args.sigma.context("--sigma is required with --mu for normal")?;
                SamplingModel::normal(mu, sigma)?
            }
            Distribution::Poisson => SamplingModel::poisson_from_mean(mu)?,
        },
        (Some(_), Some(_)) => bail!("--history and --mu are mutually exclusive"),
        (None, None) => bail!("one of --mu or --history is required\n{USAGE}"),
    };
    Ok(model)
}

fn main() -> anyhow::Result<()> {
    env_config::init_tracing();
    let args = parse_args()?;
    let threshold = args.threshold.context("--threshold is required")?;
    let model = build_model(&args)?;
    let request = SimulationRequest::new(threshold, args.sims)?;

    let num_threads = env_config::init_rayon_threads();
    info!(model = model.name(), sims = args.sims, num_threads, "starting estimation");

    let cancel = CancelToken::new();
    if let Some(timeout) = args.timeout {
        let watchdog = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(timeout);
            watchdog.cancel();
        });
    }

    let estimator = Estimator::new(EstimatorConfig {
        seed: args.seed,
        ..EstimatorConfig::default()
    });
    let t0 = Instant::now();
    let Some(result) = estimator.run_cancellable(&model, &request, &cancel)? else {
        bail!("estimation cancelled after {:.2}s", t0.elapsed().as_secs_f64());
    };
    let elapsed = t0.elapsed();
    let analytic = model_tail(&model, threshold)?;

    if args.json {
        let out = serde_json::json!({
            "model": model,
            "request": request,
            "result": result,
            "analytic_probability": analytic,
            "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Monte Carlo threshold estimate ({})", model.name());
    if let SamplingModel::Normal(p) = &model {
        println!("  mu = {:.4}, sigma = {:.4}", p.mu, p.sigma);
    }
    if let SamplingModel::Poisson { lambda } = &model {
        println!("  lambda = {:.4}", lambda);
    }
    println!("  threshold:       {}", threshold);
    println!("  sims:            {}", result.sims);
    println!("  hits:            {}", result.hits);
    println!("  P(X > t):        {:.6}", result.probability);
    println!("  std error:       {:.6}", result.standard_error);
    println!(
        "  95% interval:    [{:.6}, {:.6}]",
        result.confidence.lower, result.confidence.upper
    );
    println!("  closed form:     {:.6}", analytic);
    println!(
        "  elapsed:         {:.1} ms ({:.1}M draws/s)",
        elapsed.as_secs_f64() * 1000.0,
        result.sims as f64 / elapsed.as_secs_f64().max(1e-9) / 1e6
    );
    Ok(())
}

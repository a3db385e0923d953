//! Axum HTTP server: stateless estimation endpoints.
//!
//! Every request builds its own [`Estimator`]; the shared state only carries
//! defaults and the `sims` cap. Sampling runs on the blocking pool so large
//! runs do not stall the async workers, and each request holds a
//! [`CancelGuard`] so a dropped connection stops its sampling work.
//!
//! Malformed query strings and bodies get the same `400 {"error": ...}` shape
//! as validation failures.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/estimate` | P(X > threshold) for a normal or Poisson model |
//! | POST | `/estimate/history` | Fit a model to observed values, then estimate |
//! | POST | `/report` | Poisson + bootstrap report with blended probability |

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::analytic::model_tail;
use crate::error::{EstimateError, EstimateResult};
use crate::report::threshold_report_cancellable;
use crate::simulation::cancel::{CancelGuard, CancelToken};
use crate::simulation::engine::{Estimator, EstimatorConfig};
use crate::types::{Distribution, SamplingModel, SimulationRequest};

/// Server-wide defaults.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub default_sims: u64,
    /// Requests asking for more draws than this are rejected.
    pub max_sims: u64,
}

impl ServerConfig {
    /// Requested `sims` or the default, checked against the cap.
    fn resolve_sims(&self, requested: Option<u64>) -> Result<u64, ApiError> {
        let sims = requested.unwrap_or(self.default_sims);
        if sims > self.max_sims {
            return Err(bad_request(EstimateError::invalid(format!(
                "sims must be at most {}, got {sims}",
                self.max_sims
            ))));
        }
        Ok(sims)
    }
}

pub type AppState = Arc<ServerConfig>;

pub fn create_router(config: Arc<ServerConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health_check))
        .route("/estimate", get(handle_estimate))
        .route("/estimate/history", post(handle_estimate_history))
        .route("/report", post(handle_report))
        .layer(cors)
        .with_state(config)
}

// ── Request/Response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct EstimateQuery {
    mu: f64,
    sigma: Option<f64>,
    threshold: f64,
    sims: Option<u64>,
    seed: Option<u64>,
    #[serde(default)]
    distribution: Distribution,
}

#[derive(Deserialize)]
struct HistoryRequest {
    points: Vec<f64>,
    threshold: f64,
    #[serde(default)]
    distribution: Distribution,
    /// Resample the observations directly instead of fitting a parametric model.
    #[serde(default)]
    bootstrap: bool,
    sims: Option<u64>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct ReportRequest {
    #[serde(default)]
    points: Vec<f64>,
    threshold: f64,
    season_mean: Option<f64>,
    sims: Option<u64>,
    seed: Option<u64>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, msg: &str) -> ApiError {
    (status, Json(serde_json::json!({ "error": msg })))
}

fn bad_request(err: EstimateError) -> ApiError {
    warn!(%err, "rejected request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn estimator_for(seed: Option<u64>) -> Estimator {
    Estimator::new(EstimatorConfig {
        seed,
        ..EstimatorConfig::default()
    })
}

fn rejected(msg: String) -> ApiError {
    warn!(%msg, "malformed request");
    error_response(StatusCode::BAD_REQUEST, &msg)
}

fn query_or_400<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query.map(|Query(v)| v).map_err(|e| rejected(e.body_text()))
}

fn json_or_400<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(v)| v).map_err(|e| rejected(e.body_text()))
}

/// Run a cancellable sampling job on the blocking pool.
///
/// The job's token is cancelled when the returned future is dropped or
/// completes, so abandoned requests release the rayon pool.
async fn run_blocking<T, F>(job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&CancelToken) -> EstimateResult<Option<T>> + Send + 'static,
{
    let cancel = CancelToken::new();
    let _guard: CancelGuard = cancel.drop_guard();
    let token = cancel.clone();
    match tokio::task::spawn_blocking(move || job(&token)).await {
        Ok(Ok(Some(value))) => Ok(value),
        Ok(Ok(None)) => Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "estimation cancelled",
        )),
        Ok(Err(err)) => Err(bad_request(err)),
        Err(join_err) => {
            warn!(%join_err, "estimation task failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "estimation task failed",
            ))
        }
    }
}

/// Run `model` and pair the estimate with the closed-form tail.
fn estimate_json(
    model: SamplingModel,
    threshold: f64,
    sims: u64,
    seed: Option<u64>,
    cancel: &CancelToken,
) -> EstimateResult<Option<serde_json::Value>> {
    let request = SimulationRequest::new(threshold, sims)?;
    let Some(result) = estimator_for(seed).run_cancellable(&model, &request, cancel)? else {
        return Ok(None);
    };
    let analytic = model_tail(&model, threshold)?;
    Ok(Some(serde_json::json!({
        "model": model,
        "request": request,
        "result": result,
        "analytic_probability": analytic,
    })))
}

// ── GET handlers ────────────────────────────────────────────────────

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn handle_estimate(
    State(config): State<AppState>,
    query: Result<Query<EstimateQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let params = query_or_400(query)?;
    let model = match params.distribution {
        Distribution::Normal => {
            let sigma = params
                .sigma
                .ok_or_else(|| bad_request(EstimateError::invalid("sigma is required for normal")))?;
            SamplingModel::normal(params.mu, sigma).map_err(bad_request)?
        }
        Distribution::Poisson => SamplingModel::poisson_from_mean(params.mu).map_err(bad_request)?,
    };
    let sims = config.resolve_sims(params.sims)?;
    let threshold = params.threshold;
    let seed = params.seed;

    run_blocking(move |cancel| estimate_json(model, threshold, sims, seed, cancel))
        .await
        .map(Json)
}

// ── POST handlers ───────────────────────────────────────────────────

async fn handle_estimate_history(
    State(config): State<AppState>,
    body: Result<Json<HistoryRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = json_or_400(body)?;
    let sims = config.resolve_sims(req.sims)?;
    run_blocking(move |cancel| {
        let model = if req.bootstrap {
            SamplingModel::bootstrap(&req.points)?
        } else {
            SamplingModel::from_history(&req.points, req.distribution)?
        };
        estimate_json(model, req.threshold, sims, req.seed, cancel)
    })
    .await
    .map(Json)
}

async fn handle_report(
    State(config): State<AppState>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let req = json_or_400(body)?;
    let sims = config.resolve_sims(req.sims)?;
    let report = run_blocking(move |cancel| {
        threshold_report_cancellable(
            &estimator_for(req.seed),
            &req.points,
            req.threshold,
            req.season_mean,
            sims,
            cancel,
        )
    })
    .await?;

    serde_json::to_value(&report).map(Json).map_err(|e| {
        warn!(%e, "failed to serialize report");
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to serialize report")
    })
}

//! Repo Readiness Service: binary entrypoint.
//! Boots the Axum HTTP server with the evaluator as shared state.

use shuttle_axum::ShuttleAxum;
use tracing::info;

use repo_readiness::config::metrics_enabled;
use repo_readiness::metrics::Metrics;
use repo_readiness::{api, init_tracing, AppState, Evaluator};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let evaluator = Evaluator::from_env()?;
    let metrics = if metrics_enabled() {
        Metrics::init()
    } else {
        None
    };
    info!(metrics = metrics.is_some(), "starting repo-readiness");

    let state = AppState::new(evaluator).with_metrics(metrics);
    Ok(api::router(state).into())
}

// src/api.rs
//! Thin inbound HTTP adapter around the evaluator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use shuttle_axum::axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::error::PipelineError;
use crate::evaluation::{FinalEvaluation, Role};
use crate::metrics::Metrics;
use crate::pipeline::{Evaluator, RepoMeta};

#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<Evaluator>,
    /// Mounted at `/metrics` when present.
    pub metrics: Option<Metrics>,
}

impl AppState {
    pub fn new(evaluator: Evaluator) -> Self {
        Self {
            evaluator: Arc::new(evaluator),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }
}

pub fn router(state: AppState) -> Router {
    let metrics = state.metrics.clone();
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze-repo", post(analyze_repo))
        .with_state(state);

    let app = match metrics {
        Some(m) => app.merge(m.router()),
        None => app,
    };
    app.layer(CorsLayer::very_permissive())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRepoReq {
    #[serde(default)]
    repo_url: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRepoResp {
    success: bool,
    evaluation: FinalEvaluation,
    repo_meta: RepoMeta,
}

/// Request validation failures (before the pipeline runs).
#[derive(Debug)]
struct BadRequest(String);

impl IntoResponse for BadRequest {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.0 }))).into_response()
    }
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status = match &self {
            PipelineError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            PipelineError::RepositoryNotFound(_) => StatusCode::NOT_FOUND,
            PipelineError::ScorerRateLimited => StatusCode::TOO_MANY_REQUESTS,
            PipelineError::ScorerQuotaExhausted => StatusCode::PAYMENT_REQUIRED,
            PipelineError::ScorerTransportFailure(_) | PipelineError::UnparsableEvaluation(_) => {
                StatusCode::BAD_GATEWAY
            }
            PipelineError::UnknownFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": self.to_string(), "kind": self.kind() });
        (status, Json(body)).into_response()
    }
}

async fn analyze_repo(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRepoReq>, JsonRejection>,
) -> Result<Json<AnalyzeRepoResp>, Response> {
    let Json(body) = payload.map_err(|rej| {
        BadRequest(format!("Invalid request body: {}", rej.body_text())).into_response()
    })?;
    let url = body
        .repo_url
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BadRequest("Repository URL is required".into()).into_response())?;
    let role_raw = body
        .role
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| BadRequest("Role selection is required".into()).into_response())?;
    let role: Role = role_raw
        .parse()
        .map_err(|e: crate::evaluation::UnknownRole| BadRequest(e.to_string()).into_response())?;

    info!(role = %role, "analyze-repo request");
    let outcome = state.evaluator.run(&url, role).await;
    let assessment = outcome.result.map_err(IntoResponse::into_response)?;

    Ok(Json(AnalyzeRepoResp {
        success: true,
        evaluation: assessment.evaluation,
        repo_meta: assessment.repo_meta,
    }))
}

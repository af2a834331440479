// src/pipeline.rs
//! Pipeline orchestrator.
//!
//! `Idle -> Extracting -> Assembling -> Scoring -> Parsing -> PostProcessing -> Done`,
//! with any failure jumping straight to `Failed`. The evaluator holds no
//! mutable state, so one instance serves concurrent requests.

use metrics::{counter, histogram};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{HostConfig, ScorerConfig};
use crate::error::PipelineError;
use crate::evaluation::{finalize, parse_evaluation, FinalEvaluation, Role};
use crate::prompt::assemble;
use crate::scorer::{build_scorer, Scorer};
use crate::signals::derive::truncate_chars;
use crate::signals::{extract_signals, GithubClient, RepositoryHost, RepositorySignals};

/// Raw scorer text echoed to debug logs when parsing fails.
const RAW_LOG_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Extracting,
    Assembling,
    Scoring,
    Parsing,
    PostProcessing,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::Extracting => "extracting",
            Stage::Assembling => "assembling",
            Stage::Scoring => "scoring",
            Stage::Parsing => "parsing",
            Stage::PostProcessing => "post_processing",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short repository facts returned next to the evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoMeta {
    pub name: String,
    pub language: String,
    pub stars: u64,
}

impl From<&RepositorySignals> for RepoMeta {
    fn from(s: &RepositorySignals) -> Self {
        Self {
            name: s.name.clone(),
            language: s.primary_language.clone(),
            stars: s.star_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub evaluation: FinalEvaluation,
    pub repo_meta: RepoMeta,
}

/// Result of one run plus the stages it passed through.
#[derive(Debug)]
pub struct RunOutcome {
    pub stages: Vec<Stage>,
    pub result: Result<Assessment, PipelineError>,
}

pub struct Evaluator {
    host: Arc<dyn RepositoryHost>,
    scorer: Arc<dyn Scorer>,
    lookup_timeout: Duration,
}

impl Evaluator {
    pub fn new(
        host: Arc<dyn RepositoryHost>,
        scorer: Arc<dyn Scorer>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            host,
            scorer,
            lookup_timeout,
        }
    }

    /// GitHub host + configured scorer, both from the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_config(&HostConfig::from_env(), &ScorerConfig::from_env())
    }

    pub fn from_config(host: &HostConfig, scorer: &ScorerConfig) -> anyhow::Result<Self> {
        let github = GithubClient::new(host)?;
        if !scorer.mock && !scorer.has_credential() {
            warn!("scorer API key not set; evaluations will fail until it is configured");
        }
        let scorer = build_scorer(scorer)?;
        info!(
            host = github.name(),
            host_url = github.base_url(),
            scorer = scorer.name(),
            lookup_timeout_secs = host.timeout_secs,
            "evaluator ready"
        );
        Ok(Self::new(
            Arc::new(github),
            scorer,
            Duration::from_secs(host.timeout_secs.max(1)),
        ))
    }

    /// Single entry point: URL + role -> final evaluation or typed error.
    pub async fn evaluate(&self, url: &str, role: Role) -> Result<FinalEvaluation, PipelineError> {
        self.run(url, role).await.result.map(|a| a.evaluation)
    }

    pub async fn run(&self, url: &str, role: Role) -> RunOutcome {
        let t0 = Instant::now();
        let mut stages = vec![Stage::Idle];
        let result = self.drive(url, role, &mut stages).await;

        match &result {
            Ok(a) => {
                stages.push(Stage::Done);
                counter!("evaluations_total", "outcome" => "ok").increment(1);
                histogram!("evaluation_final_score").record(f64::from(a.evaluation.score));
                info!(
                    role = %role,
                    repo = %a.repo_meta.name,
                    score = a.evaluation.score,
                    tier = %a.evaluation.tier,
                    badge = %a.evaluation.badge,
                    caps = a.evaluation.applied_caps.len(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "evaluation done"
                );
            }
            Err(e) => {
                let failed_in = stages.last().copied().unwrap_or(Stage::Idle);
                stages.push(Stage::Failed);
                counter!("evaluations_total", "outcome" => e.kind()).increment(1);
                warn!(
                    role = %role,
                    stage = %failed_in,
                    kind = e.kind(),
                    error = %e,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "evaluation failed"
                );
            }
        }

        RunOutcome { stages, result }
    }

    async fn drive(
        &self,
        url: &str,
        role: Role,
        stages: &mut Vec<Stage>,
    ) -> Result<Assessment, PipelineError> {
        enter(stages, Stage::Extracting);
        let signals = extract_signals(self.host.clone(), url, self.lookup_timeout).await?;

        enter(stages, Stage::Assembling);
        let request = assemble(role, &signals);
        debug!(chars = request.len_chars(), "evaluation request assembled");

        enter(stages, Stage::Scoring);
        let raw_text = self.scorer.score(&request).await?;

        enter(stages, Stage::Parsing);
        let raw = parse_evaluation(&raw_text).map_err(|e| {
            debug!(
                raw = %truncate_chars(&raw_text, RAW_LOG_MAX_CHARS),
                error = %e,
                "unparsable scorer response"
            );
            PipelineError::from(e)
        })?;

        enter(stages, Stage::PostProcessing);
        let evaluation = finalize(raw, &signals);

        Ok(Assessment {
            evaluation,
            repo_meta: RepoMeta::from(&signals),
        })
    }
}

fn enter(stages: &mut Vec<Stage>, next: Stage) {
    debug!(stage = %next, "pipeline stage");
    stages.push(next);
}

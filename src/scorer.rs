// src/scorer.rs
//! Generative scorer contract: provider abstraction + OpenAI-compatible
//! chat-completions client + deterministic mock. One call per evaluation,
//! no retries here.

use async_trait::async_trait;
use metrics::histogram;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ScorerConfig;
use crate::prompt::EvaluationRequest;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScorerError {
    #[error("scorer rate limit exceeded")]
    RateLimited,
    /// Authorization rejected or credits exhausted (HTTP status attached).
    #[error("scorer quota or authorization exhausted (status {0})")]
    QuotaExhausted(u16),
    #[error("scorer transport failure: {0}")]
    Transport(String),
    #[error("scorer returned an empty response")]
    EmptyResponse,
    #[error("{0}")]
    NotConfigured(String),
}

/// Opaque `EvaluationRequest -> raw text` function.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, request: &EvaluationRequest) -> Result<String, ScorerError>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynScorer = Arc<dyn Scorer>;

/// Factory: mock when `config.mock`, otherwise the HTTP client.
pub fn build_scorer(config: &ScorerConfig) -> Result<DynScorer, ScorerError> {
    if config.mock {
        return Ok(Arc::new(MockScorer::new(MockScorer::CANNED)));
    }
    Ok(Arc::new(ChatCompletionsScorer::new(config)?))
}

// ------------------------------------------------------------
// Chat-completions provider
// ------------------------------------------------------------

pub struct ChatCompletionsScorer {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsScorer {
    pub fn new(config: &ScorerConfig) -> Result<Self, ScorerError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("repo-readiness/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ScorerError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Scorer for ChatCompletionsScorer {
    async fn score(&self, request: &EvaluationRequest) -> Result<String, ScorerError> {
        if self.api_key.is_empty() {
            return Err(ScorerError::NotConfigured(
                "scorer API key is not configured".to_string(),
            ));
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: request.system,
                },
                Msg {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let t0 = Instant::now();
        let resp = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScorerError::Transport("scorer request timed out".to_string())
                } else {
                    ScorerError::Transport(e.to_string())
                }
            })?;
        histogram!("scorer_duration_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let status = resp.status().as_u16();
        match status {
            429 => return Err(ScorerError::RateLimited),
            401 | 402 | 403 => return Err(ScorerError::QuotaExhausted(status)),
            s if !(200..300).contains(&s) => {
                let text = resp.text().await.unwrap_or_default();
                warn!(status = s, body_len = text.len(), "scorer gateway error");
                return Err(ScorerError::Transport(format!("scorer returned status {s}")));
            }
            _ => {}
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| ScorerError::Transport(format!("invalid scorer response: {e}")))?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(ScorerError::EmptyResponse);
        }
        debug!(chars = content.len(), "scorer response received");
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "chat-completions"
    }
}

// ------------------------------------------------------------
// Mock provider
// ------------------------------------------------------------

/// Returns a fixed response and counts calls; for tests and local runs.
pub struct MockScorer {
    response: Result<String, ScorerError>,
    calls: AtomicUsize,
}

impl MockScorer {
    /// A plausible fenced response used by `SCORER_TEST_MODE=mock`.
    pub const CANNED: &'static str = r#"Here is the evaluation:
```json
{
  "score": 68,
  "tier": "Hire-Approaching",
  "badge": "bronze",
  "summary": "Solid small project with clear structure. Testing and documentation are thin for a hiring signal.",
  "strengths": ["Clear module layout", "Consistent commit messages"],
  "gaps": ["Few tests", "README lacks setup steps"],
  "roadmap": [
    {"action": "Add integration tests for the main flows", "impact": "high", "effort": "medium", "reason": "Recruiters look for a testing culture"}
  ],
  "categoryScores": {
    "codeQuality": 17,
    "projectStructure": 11,
    "documentation": 8,
    "testing": 6,
    "realWorldApplicability": 10,
    "gitHygiene": 10
  }
}
```"#;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: ScorerError) -> Self {
        Self {
            response: Err(err),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scorer for MockScorer {
    async fn score(&self, _request: &EvaluationRequest) -> Result<String, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Role;
    use crate::prompt::assemble;
    use crate::signals::RepositorySignals;

    #[tokio::test]
    async fn missing_key_is_not_configured_without_network() {
        let cfg = ScorerConfig {
            api_url: "http://127.0.0.1:1/v1/chat/completions".into(),
            ..ScorerConfig::default()
        };
        let scorer = ChatCompletionsScorer::new(&cfg).unwrap();
        let req = assemble(Role::Backend, &RepositorySignals::default());
        assert!(matches!(
            scorer.score(&req).await,
            Err(ScorerError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn mock_counts_calls_and_replays_errors() {
        let req = assemble(Role::Backend, &RepositorySignals::default());
        let ok = MockScorer::new("{}");
        assert_eq!(ok.score(&req).await.unwrap(), "{}");
        assert_eq!(ok.calls(), 1);

        let bad = MockScorer::failing(ScorerError::RateLimited);
        assert_eq!(bad.score(&req).await, Err(ScorerError::RateLimited));
    }

    #[test]
    fn factory_honours_mock_flag() {
        let cfg = ScorerConfig {
            mock: true,
            ..ScorerConfig::default()
        };
        assert_eq!(build_scorer(&cfg).unwrap().name(), "mock");
        assert_eq!(
            build_scorer(&ScorerConfig::default()).unwrap().name(),
            "chat-completions"
        );
    }
}

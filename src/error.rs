// src/error.rs
//! Pipeline error taxonomy. Every component failure is mapped into one of
//! these kinds at the orchestrator boundary; callers never see raw transport
//! or parse errors.

use thiserror::Error;

use crate::evaluation::parser::ParseError;
use crate::scorer::ScorerError;
use crate::signals::HostError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Input did not match `host/owner/name`. Never retried.
    #[error("Invalid GitHub URL format: {0}")]
    InvalidUrl(String),

    /// Primary metadata lookup failed; the user must correct the input.
    #[error("Repository not found or not accessible: {0}")]
    RepositoryNotFound(String),

    #[error("Rate limit exceeded. Please try again later.")]
    ScorerRateLimited,

    #[error("AI credits exhausted. Please add credits to continue.")]
    ScorerQuotaExhausted,

    #[error("AI evaluation failed: {0}")]
    ScorerTransportFailure(String),

    #[error("Failed to parse evaluation results: {0}")]
    UnparsableEvaluation(String),

    #[error("Analysis failed: {0}")]
    UnknownFailure(String),
}

impl PipelineError {
    /// Stable machine-readable kind (used in API bodies and metric labels).
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidUrl(_) => "invalid_url",
            PipelineError::RepositoryNotFound(_) => "repository_not_found",
            PipelineError::ScorerRateLimited => "scorer_rate_limited",
            PipelineError::ScorerQuotaExhausted => "scorer_quota_exhausted",
            PipelineError::ScorerTransportFailure(_) => "scorer_transport_failure",
            PipelineError::UnparsableEvaluation(_) => "unparsable_evaluation",
            PipelineError::UnknownFailure(_) => "unknown_failure",
        }
    }

    /// Whether a user retrying the same input could reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PipelineError::ScorerRateLimited
                | PipelineError::ScorerTransportFailure(_)
                | PipelineError::UnparsableEvaluation(_)
        )
    }
}

impl From<HostError> for PipelineError {
    fn from(value: HostError) -> Self {
        match value {
            HostError::InvalidUrl(url) => PipelineError::InvalidUrl(url),
            HostError::Status { status, message } => {
                let detail = message.unwrap_or_else(|| status.to_string());
                PipelineError::RepositoryNotFound(detail)
            }
            HostError::Transport(msg) | HostError::Decode(msg) => {
                PipelineError::RepositoryNotFound(msg)
            }
            HostError::Timeout(lookup) => {
                PipelineError::RepositoryNotFound(format!("{lookup} lookup timed out"))
            }
        }
    }
}

impl From<ScorerError> for PipelineError {
    fn from(value: ScorerError) -> Self {
        match value {
            ScorerError::RateLimited => PipelineError::ScorerRateLimited,
            ScorerError::QuotaExhausted(_) => PipelineError::ScorerQuotaExhausted,
            ScorerError::Transport(msg) => PipelineError::ScorerTransportFailure(msg),
            ScorerError::EmptyResponse => {
                PipelineError::UnparsableEvaluation("No response from AI".to_string())
            }
            ScorerError::NotConfigured(msg) => PipelineError::UnknownFailure(msg),
        }
    }
}

impl From<ParseError> for PipelineError {
    fn from(value: ParseError) -> Self {
        PipelineError::UnparsableEvaluation(value.to_string())
    }
}

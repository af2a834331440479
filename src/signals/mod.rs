// src/signals/mod.rs
//! Signal extraction: turns a repository URL into a bounded set of objective
//! facts. No judgment and no scoring happen here.

pub mod derive;
pub mod extract;
pub mod github;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use extract::extract_signals;
pub use github::GithubClient;

/// README is truncated to this many characters.
pub const README_MAX_CHARS: usize = 8000;
/// File list is truncated to this many entries.
pub const FILE_LIST_MAX: usize = 200;
/// Number of newest commit subjects kept.
pub const COMMIT_MESSAGES_MAX: usize = 20;
/// Commits requested from the host (newest first).
pub const COMMITS_PER_PAGE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("invalid repository url: {0}")]
    InvalidUrl(String),
    #[error("host returned status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("host request failed: {0}")]
    Transport(String),
    #[error("unexpected host response: {0}")]
    Decode(String),
    #[error("{0} lookup timed out")]
    Timeout(&'static str),
}

/// `owner/name` pair parsed from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse `[scheme://][www.]github.com/owner/name[.git][/...]`.
    pub fn parse(url: &str) -> Result<Self, HostError> {
        static RE: OnceCell<Regex> = OnceCell::new();
        let re = RE.get_or_init(|| {
            Regex::new(
                r"(?i)^(?:https?://)?(?:www\.)?github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?(?:[/?#].*)?$",
            )
            .expect("repo url regex")
        });

        let trimmed = url.trim();
        let caps = re
            .captures(trimmed)
            .ok_or_else(|| HostError::InvalidUrl(trimmed.to_string()))?;
        let owner = caps[1].to_string();
        let name = caps[2].to_string();
        if [&owner, &name].iter().any(|s| s.chars().all(|c| c == '.')) {
            return Err(HostError::InvalidUrl(trimmed.to_string()));
        }
        Ok(Self { owner, name })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Repository metadata as returned by the host's primary lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RepoMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub date: Option<DateTime<Utc>>,
    pub message: String,
}

/// Read-only lookups against a repository host.
///
/// Only `metadata` is mandatory for extraction; the other three are
/// best-effort and degrade to empty values on failure.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    async fn metadata(&self, repo: &RepoRef) -> Result<RepoMetadata, HostError>;
    /// Decoded README text, `None` when the repository has none.
    async fn readme(&self, repo: &RepoRef) -> Result<Option<String>, HostError>;
    /// All blob paths of the default branch, recursively.
    async fn file_tree(&self, repo: &RepoRef) -> Result<Vec<String>, HostError>;
    /// Up to `COMMITS_PER_PAGE` commits, newest first.
    async fn commits(&self, repo: &RepoRef) -> Result<Vec<CommitInfo>, HostError>;
    fn name(&self) -> &'static str;
}

/// Objective facts about one repository. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySignals {
    pub name: String,
    pub description: String,
    pub primary_language: String,
    pub star_count: u64,
    pub fork_count: u64,
    pub created_at: String,
    pub updated_at: String,
    pub readme_text: String,
    pub file_paths: Vec<String>,
    pub commit_count: usize,
    pub unique_commit_days: usize,
    pub recent_commit_messages: Vec<String>,
    pub has_tests: bool,
    pub has_linting: bool,
    pub has_package_manifest: bool,
}

impl RepositorySignals {
    pub fn has_readme(&self) -> bool {
        !self.readme_text.trim().is_empty()
    }

    /// Neither a description nor a README states what the project is for.
    pub fn states_no_purpose(&self) -> bool {
        self.description.trim().is_empty() && !self.has_readme()
    }
}

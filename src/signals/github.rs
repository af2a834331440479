// src/signals/github.rs
//! GitHub REST implementation of [`RepositoryHost`].

use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CommitInfo, HostError, RepoMetadata, RepoRef, RepositoryHost, COMMITS_PER_PAGE};
use crate::config::HostConfig;

const USER_AGENT_VALUE: &str = concat!("repo-readiness/", env!("CARGO_PKG_VERSION"));
const ACCEPT_VALUE: &str = "application/vnd.github.v3+json";

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct ReadmeBody {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Deserialize)]
struct TreeBody {
    #[serde(default)]
    tree: Vec<TreeEntry>,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    #[serde(default)]
    author: Option<Signature>,
    #[serde(default)]
    committer: Option<Signature>,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct Signature {
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl GithubClient {
    pub fn new(config: &HostConfig) -> Result<Self, HostError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| HostError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, HostError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "github GET");
        let mut req = self.http.get(&url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                HostError::Transport(format!("request to {path} timed out"))
            } else {
                HostError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.message);
        Err(HostError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RepositoryHost for GithubClient {
    async fn metadata(&self, repo: &RepoRef) -> Result<RepoMetadata, HostError> {
        let resp = self.get(&format!("/repos/{}/{}", repo.owner, repo.name)).await?;
        resp.json::<RepoMetadata>()
            .await
            .map_err(|e| HostError::Decode(format!("repository metadata: {e}")))
    }

    async fn readme(&self, repo: &RepoRef) -> Result<Option<String>, HostError> {
        let resp = match self
            .get(&format!("/repos/{}/{}/readme", repo.owner, repo.name))
            .await
        {
            Ok(r) => r,
            Err(HostError::Status { status: 404, .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let body: ReadmeBody = resp
            .json()
            .await
            .map_err(|e| HostError::Decode(format!("readme: {e}")))?;

        let Some(content) = body.content else {
            return Ok(None);
        };
        if body
            .encoding
            .as_deref()
            .is_some_and(|enc| !enc.eq_ignore_ascii_case("base64"))
        {
            return Ok(Some(content));
        }
        decode_base64_text(&content).map(Some)
    }

    async fn file_tree(&self, repo: &RepoRef) -> Result<Vec<String>, HostError> {
        let resp = self
            .get(&format!(
                "/repos/{}/{}/git/trees/HEAD?recursive=1",
                repo.owner, repo.name
            ))
            .await?;
        let body: TreeBody = resp
            .json()
            .await
            .map_err(|e| HostError::Decode(format!("tree: {e}")))?;
        Ok(body
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob")
            .map(|entry| entry.path)
            .collect())
    }

    async fn commits(&self, repo: &RepoRef) -> Result<Vec<CommitInfo>, HostError> {
        let resp = self
            .get(&format!(
                "/repos/{}/{}/commits?per_page={}",
                repo.owner, repo.name, COMMITS_PER_PAGE
            ))
            .await?;
        let entries: Vec<CommitEntry> = resp
            .json()
            .await
            .map_err(|e| HostError::Decode(format!("commits: {e}")))?;
        Ok(entries
            .into_iter()
            .map(|e| CommitInfo {
                date: e
                    .commit
                    .author
                    .and_then(|s| s.date)
                    .or_else(|| e.commit.committer.and_then(|s| s.date)),
                message: e.commit.message,
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

/// GitHub wraps base64 content at 60 columns; strip whitespace before decoding.
fn decode_base64_text(content: &str) -> Result<String, HostError> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| HostError::Decode(format!("readme base64: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

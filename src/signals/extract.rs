// src/signals/extract.rs
//! Concurrent extraction. The metadata lookup is mandatory; README, tree and
//! commits run as independent tasks and each degrades to an empty value on
//! failure or timeout without affecting its siblings.

use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::derive::{
    has_linting, has_package_manifest, has_tests, recent_subjects, truncate_chars,
    unique_commit_days,
};
use super::{
    CommitInfo, HostError, RepoRef, RepositoryHost, RepositorySignals, COMMIT_MESSAGES_MAX,
    FILE_LIST_MAX, README_MAX_CHARS,
};

/// Fetch and derive signals for `url`. Fails only on a malformed URL
/// (`HostError::InvalidUrl`, before any network call) or a failed metadata
/// lookup.
pub async fn extract_signals(
    host: Arc<dyn RepositoryHost>,
    url: &str,
    lookup_timeout: Duration,
) -> Result<RepositorySignals, HostError> {
    let repo = RepoRef::parse(url)?;
    let t0 = Instant::now();
    info!(repo = %repo.slug(), host = host.name(), "extracting repository signals");

    let readme_task = spawn_lookup("readme", lookup_timeout, {
        let (host, repo) = (host.clone(), repo.clone());
        async move { host.readme(&repo).await }
    });
    let tree_task = spawn_lookup("tree", lookup_timeout, {
        let (host, repo) = (host.clone(), repo.clone());
        async move { host.file_tree(&repo).await }
    });
    let commits_task = spawn_lookup("commits", lookup_timeout, {
        let (host, repo) = (host.clone(), repo.clone());
        async move { host.commits(&repo).await }
    });

    let meta = match bounded("metadata", lookup_timeout, host.metadata(&repo)).await {
        Ok(m) => m,
        Err(e) => {
            readme_task.abort();
            tree_task.abort();
            commits_task.abort();
            warn!(repo = %repo.slug(), error = %e, "metadata lookup failed");
            return Err(e);
        }
    };

    let readme: Option<String> = settle("readme", readme_task).await.flatten();
    let tree: Vec<String> = settle("tree", tree_task).await.unwrap_or_default();
    let commits: Vec<CommitInfo> = settle("commits", commits_task).await.unwrap_or_default();

    let signals = RepositorySignals {
        name: if meta.name.is_empty() {
            repo.name.clone()
        } else {
            meta.name
        },
        description: meta.description.unwrap_or_default(),
        primary_language: meta
            .language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
        star_count: meta.stargazers_count,
        fork_count: meta.forks_count,
        created_at: meta.created_at.unwrap_or_default(),
        updated_at: meta.updated_at.unwrap_or_default(),
        readme_text: truncate_chars(readme.as_deref().unwrap_or_default(), README_MAX_CHARS),
        // Derived flags look at the whole tree; only the list is truncated.
        has_tests: has_tests(&tree),
        has_linting: has_linting(&tree),
        has_package_manifest: has_package_manifest(&tree),
        file_paths: tree.into_iter().take(FILE_LIST_MAX).collect(),
        commit_count: commits.len(),
        unique_commit_days: unique_commit_days(&commits),
        recent_commit_messages: recent_subjects(&commits, COMMIT_MESSAGES_MAX),
    };

    info!(
        repo = %repo.slug(),
        files = signals.file_paths.len(),
        commits = signals.commit_count,
        unique_days = signals.unique_commit_days,
        has_readme = signals.has_readme(),
        has_tests = signals.has_tests,
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "signals extracted"
    );
    Ok(signals)
}

async fn bounded<T>(
    lookup: &'static str,
    limit: Duration,
    fut: impl Future<Output = Result<T, HostError>>,
) -> Result<T, HostError> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(HostError::Timeout(lookup)))
}

fn spawn_lookup<T, F>(
    lookup: &'static str,
    limit: Duration,
    fut: F,
) -> JoinHandle<Result<T, HostError>>
where
    T: Send + 'static,
    F: Future<Output = Result<T, HostError>> + Send + 'static,
{
    tokio::spawn(bounded(lookup, limit, fut))
}

/// Await a best-effort lookup; any failure becomes `None`.
async fn settle<T>(lookup: &'static str, task: JoinHandle<Result<T, HostError>>) -> Option<T> {
    match task.await {
        Ok(Ok(v)) => Some(v),
        Ok(Err(e)) => {
            debug!(lookup, error = %e, "secondary lookup degraded to default");
            counter!("host_lookup_failures_total", "lookup" => lookup).increment(1);
            None
        }
        Err(e) => {
            warn!(lookup, error = %e, "secondary lookup task failed");
            counter!("host_lookup_failures_total", "lookup" => lookup).increment(1);
            None
        }
    }
}

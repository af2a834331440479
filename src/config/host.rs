// src/config/host.rs
use std::env;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_TIMEOUT_SECS: u64 = 10;

pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_TIMEOUT_SECS: &str = "GITHUB_TIMEOUT_SECS";

/// Repository host (GitHub REST) settings. The token is optional; without it
/// the host's anonymous rate limit applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub api_url: String,
    pub token: Option<String>,
    /// Bound for each individual lookup.
    pub timeout_secs: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_GITHUB_TIMEOUT_SECS,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let api_url = env::var(ENV_GITHUB_API_URL)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);
        let token = env::var(ENV_GITHUB_TOKEN)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Self {
            api_url,
            token,
            timeout_secs: super::parse_secs_env(ENV_GITHUB_TIMEOUT_SECS, defaults.timeout_secs),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs.max(1);
        self
    }
}

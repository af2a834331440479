// src/config/scorer.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};
use tracing::warn;

pub const DEFAULT_SCORER_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SCORER_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SCORER_TIMEOUT_SECS: u64 = 60;

pub const ENV_SCORER_API_URL: &str = "SCORER_API_URL";
pub const ENV_SCORER_API_KEY: &str = "SCORER_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_SCORER_MODEL: &str = "SCORER_MODEL";
pub const ENV_SCORER_TIMEOUT_SECS: &str = "SCORER_TIMEOUT_SECS";
pub const ENV_SCORER_TEST_MODE: &str = "SCORER_TEST_MODE";

fn default_api_url() -> String {
    DEFAULT_SCORER_API_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_SCORER_MODEL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_SCORER_TIMEOUT_SECS
}

/// Generative scorer endpoint + credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// OpenAI-compatible chat-completions URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer credential. In a config file, `"ENV"` means: read from
    /// SCORER_API_KEY (or OPENAI_API_KEY).
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `true` when SCORER_TEST_MODE=mock.
    #[serde(default)]
    pub mock: bool,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            mock: false,
        }
    }
}

impl ScorerConfig {
    /// Read `SCORER_*` variables on top of defaults. Never fails: a missing
    /// key surfaces later as a "not configured" scorer error.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: non_empty_env(ENV_SCORER_API_URL).unwrap_or(defaults.api_url),
            api_key: env_api_key().unwrap_or_default(),
            model: non_empty_env(ENV_SCORER_MODEL).unwrap_or(defaults.model),
            timeout_secs: super::parse_secs_env(ENV_SCORER_TIMEOUT_SECS, defaults.timeout_secs),
            mock: env::var(ENV_SCORER_TEST_MODE)
                .map(|v| v.trim().eq_ignore_ascii_case("mock"))
                .unwrap_or(false),
        }
    }

    /// Load from a JSON file (e.g. `config/scorer.json`).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: ScorerConfig = serde_json::from_str(&data)?;

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = env_api_key().ok_or_else(|| {
                anyhow::anyhow!("Missing {ENV_SCORER_API_KEY} / {ENV_OPENAI_API_KEY} env var")
            })?;
        }

        if cfg.timeout_secs == 0 {
            warn!(
                "scorer timeout_secs=0 in config; using {}s",
                DEFAULT_SCORER_TIMEOUT_SECS
            );
            cfg.timeout_secs = DEFAULT_SCORER_TIMEOUT_SECS;
        }
        if cfg.api_url.trim().is_empty() {
            cfg.api_url = default_api_url();
        }

        Ok(cfg)
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_api_key() -> Option<String> {
    non_empty_env(ENV_SCORER_API_KEY).or_else(|| non_empty_env(ENV_OPENAI_API_KEY))
}

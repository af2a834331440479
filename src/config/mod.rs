// src/config/mod.rs
//! Process configuration. `.env` is loaded by the binaries via `dotenvy`;
//! everything here reads plain environment variables on top of defaults.

pub mod host;
pub mod scorer;

pub use host::HostConfig;
pub use scorer::ScorerConfig;

use std::env;
use tracing::warn;

/// `METRICS_ENABLED=1` mounts `/metrics`.
pub const ENV_METRICS_ENABLED: &str = "METRICS_ENABLED";

/// Parse a positive number of seconds; zero or garbage falls back to `default`.
pub(crate) fn parse_secs_env(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => v,
            _ => {
                warn!(var = name, value = %raw, "invalid timeout; using default {default}s");
                default
            }
        },
        Err(_) => default,
    }
}

pub fn metrics_enabled() -> bool {
    env::var(ENV_METRICS_ENABLED)
        .ok()
        .is_some_and(|v| v.trim() == "1" || v.trim().eq_ignore_ascii_case("true"))
}

// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod pipeline;
pub mod prompt;
pub mod rubric;
pub mod scorer;
pub mod signals;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::error::PipelineError;
pub use crate::evaluation::{Badge, FinalEvaluation, Role, Tier};
pub use crate::pipeline::{Evaluator, Stage};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "repo_readiness=info,warn";

/// Install a compact tracing subscriber unless the host runtime already did.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

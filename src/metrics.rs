// src/metrics.rs
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::warn;

static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process. Returns `None` when
    /// another recorder already owns the global slot (e.g. in tests).
    pub fn init() -> Option<Self> {
        HANDLE
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => {
                    describe();
                    Some(handle)
                }
                Err(e) => {
                    warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .clone()
            .map(|handle| Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

fn describe() {
    describe_counter!("evaluations_total", "Evaluations by outcome (ok or error kind).");
    describe_counter!(
        "host_lookup_failures_total",
        "Best-effort host lookups that degraded to defaults."
    );
    describe_counter!("rubric_caps_applied_total", "Mandatory rubric caps applied, by cap.");
    describe_histogram!("scorer_duration_ms", "Generative scorer call latency in ms.");
    describe_histogram!("evaluation_final_score", "Final evaluation scores (0..=100).");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let a = Metrics::init().map(|m| m.handle.render().len());
        let b = Metrics::init().map(|m| m.handle.render().len());
        assert_eq!(a.is_some(), b.is_some());
    }
}

//! # Internal Metrics Module
//!
//! Everything here goes through the `metrics` facade, so whichever recorder is
//! installed (the Prometheus exporter from `MetricsBuilder`, or a test
//! recorder) receives the values.
//!
//! ## Components:
//!
//! - **`ErrorMetrics`**: The narrow seam the logger uses to count
//!   non-informational records by level.
//!
//! - **`PrometheusErrorMetrics`**: The default `ErrorMetrics`, a counter
//!   labelled by level.
//!
//! - **`AppMetrics`**: General-purpose request, payload, push and multipurpose
//!   counters/gauges for the host application, sharing the same name prefix.
//!
//! - **`MetricsBuilder`**: Installs the Prometheus recorder and its scrape
//!   endpoint.

pub mod app;

pub use app::AppMetrics;

use crate::config::MetricsConfig;
use crate::error::LogError;
use crate::level::Level;
use metrics::Unit;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use tracing::info;

/// Counts error-level records. Must not block or fail visibly.
pub trait ErrorMetrics: Send + Sync {
    fn increment_error(&self, level: Level);
}

/// Joins the namespace, subsystem and metric name, skipping empty parts.
pub(crate) fn metric_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// `ErrorMetrics` recorded as `<namespace>_<subsystem>_errors_total{level}`.
#[derive(Debug, Clone)]
pub struct PrometheusErrorMetrics {
    name: String,
}

impl PrometheusErrorMetrics {
    pub fn new(namespace: &str, subsystem: &str) -> Self {
        let name = metric_name(namespace, subsystem, "errors_total");
        metrics::describe_counter!(
            name.clone(),
            Unit::Count,
            "Number of non-informational log records, labelled by level."
        );
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ErrorMetrics for PrometheusErrorMetrics {
    fn increment_error(&self, level: Level) {
        metrics::counter!(self.name.clone(), "level" => level.as_str()).increment(1);
    }
}

/// Installs the Prometheus recorder and scrape endpoint.
pub struct MetricsBuilder {
    config: MetricsConfig,
}

impl MetricsBuilder {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    /// Installs the global recorder when metrics are enabled and a listen
    /// address is configured. Returns whether an exporter was installed.
    ///
    /// Outside a Tokio runtime the exporter runs on its own background thread.
    pub fn install(self) -> Result<bool, LogError> {
        let Some(addr) = self.config.listen_address.filter(|_| self.config.enabled) else {
            return Ok(false);
        };

        PrometheusBuilder::new()
            .with_http_listener(addr)
            .set_buckets_for_metric(
                Matcher::Suffix("seconds".to_string()),
                &[
                    0.000001, 0.00001, 0.0001, 0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 3.0, 5.0,
                    10.0, 100.0,
                ],
            )
            .map_err(|e| LogError::MetricsExporter(e.to_string()))?
            .install()
            .map_err(|e| LogError::MetricsExporter(e.to_string()))?;

        info!(%addr, "Prometheus exporter listening.");
        Ok(true)
    }
}

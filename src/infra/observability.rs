//! Logging and Prometheus metrics setup.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::config::LogFormat;

/// Prometheus handle for on-demand scrape output (e.g. GET /metrics).
pub type PrometheusHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info` for this crate
/// and the HTTP tracing layer.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("api_sut=info,tower_http=info"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

/// Install the global metrics recorder and return a handle for rendering.
///
/// Uses `PrometheusBuilder` without an HTTP listener; the application
/// exposes metrics via GET /metrics using `handle.render()`.
///
/// # Errors
/// Returns an error if a recorder is already installed or building fails.
pub fn init_metrics() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Convenience to wrap the handle in Arc for shared use in app state.
#[must_use]
pub fn init_metrics_handle() -> Option<Arc<PrometheusHandle>> {
    init_metrics().ok().map(Arc::new)
}

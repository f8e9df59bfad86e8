//! Prometheus metrics handler

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics exporter
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    // Describe metrics
    describe_counter!(
        "telephony_invocations_total",
        "Total number of telephony invocations received"
    );
    describe_counter!(
        "telephony_invocation_failures_total",
        "Total number of telephony invocations that failed"
    );
    describe_counter!(
        "meeting_joins_total",
        "Total number of sessions bound to a meeting"
    );
    describe_counter!(
        "meeting_cleanups_total",
        "Total number of attendees and meetings removed on hang-up"
    );

    Ok(handle)
}

/// Handle for a recorder that is not installed globally
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

/// HTTP metrics handler
pub async fn metrics_handler(
    axum::extract::State(prometheus_handle): axum::extract::State<PrometheusHandle>,
) -> Response {
    let metrics = prometheus_handle.render();
    (StatusCode::OK, metrics).into_response()
}

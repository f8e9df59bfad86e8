//! API Router configuration

use super::meeting_handler::{
    create_meeting, end_meeting, get_meeting, health_check, join_meeting, AppState,
};
use super::metrics_handler::metrics_handler;
use super::telephony_handler::handle_event;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router
pub fn build_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    // Health check route (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    // Telephony platform invocations
    let telephony_routes = Router::new().route("/telephony/events", post(handle_event));

    // Meeting management routes
    let meeting_routes = Router::new()
        .route("/meetings", post(create_meeting))
        .route("/meetings/join", post(join_meeting))
        .route("/meetings/end", post(end_meeting))
        .route("/meetings/:meeting_id", get(get_meeting));

    // Metrics route (separate state)
    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    // Combine routes with state
    Router::new()
        .merge(health_routes)
        .merge(telephony_routes)
        .merge(meeting_routes)
        .with_state(state)
        .merge(metrics_routes)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

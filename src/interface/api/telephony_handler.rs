//! Telephony invocation endpoint

use super::meeting_dto::ApiResponse;
use super::meeting_handler::{status_for, AppState};
use crate::domain::shared::error::DomainError;
use crate::interface::telephony::{InvocationEvent, InvocationResponse};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

/// Handle one platform invocation.
///
/// The body is decoded here rather than through the `Json` extractor so
/// that every malformed envelope is answered with 400.
pub async fn handle_event(State(state): State<AppState>, body: Bytes) -> Response {
    let invocation: InvocationEvent = match serde_json::from_slice(&body) {
        Ok(invocation) => invocation,
        Err(e) => {
            warn!("API: Rejecting malformed invocation: {}", e);
            return reject(DomainError::MalformedEvent(e.to_string()));
        }
    };

    match state.dispatcher.dispatch(invocation).await {
        Ok(response) => (StatusCode::OK, Json::<InvocationResponse>(response)).into_response(),
        Err(e) => reject(e),
    }
}

fn reject(error: DomainError) -> Response {
    (
        status_for(&error),
        Json(ApiResponse::<()>::error(error.to_string())),
    )
        .into_response()
}

//! Meeting API handlers

use super::meeting_dto::{
    ApiResponse, CreateMeetingRequest, CreateMeetingResponse, EndMeetingRequest,
    JoinMeetingRequest, JoinMeetingResponse, SessionResponse,
};
use crate::application::MeetingService;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::{EventId, MeetingId, Passcode, PhoneNumber};
use crate::interface::telephony::EventDispatcher;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub meetings: Arc<MeetingService>,
    pub dispatcher: Arc<EventDispatcher>,
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

/// HTTP status for a domain error
pub fn status_for(error: &DomainError) -> StatusCode {
    match error {
        DomainError::MalformedEvent(_) | DomainError::ValidationError(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Collaborator(_) => StatusCode::BAD_GATEWAY,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure<T>(error: DomainError) -> ApiResult<T> {
    (status_for(&error), Json(ApiResponse::error(error.to_string())))
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Create a meeting and issue passcodes
pub async fn create_meeting(
    State(state): State<AppState>,
    Json(req): Json<CreateMeetingRequest>,
) -> ApiResult<CreateMeetingResponse> {
    info!("API: Creating meeting for event {}", req.event_id);

    let event_id = EventId::new(req.event_id.as_str());
    let batch = req.is_batch();
    let participants = match req.into_participants() {
        Ok(participants) => participants,
        Err(e) => return failure(e),
    };

    match state.meetings.create_meeting(&event_id, participants).await {
        Ok(mut issued) => {
            let response = if batch {
                CreateMeetingResponse::Batch {
                    passcodes: issued.into_iter().map(Into::into).collect(),
                }
            } else {
                match issued.pop() {
                    Some(single) => CreateMeetingResponse::Single {
                        passcode: single.passcode.as_str().to_string(),
                    },
                    None => {
                        return failure(DomainError::Internal("no passcode issued".to_string()))
                    }
                }
            };
            (StatusCode::CREATED, Json(ApiResponse::success(response)))
        }
        Err(e) => {
            error!("API: Failed to create meeting for event {}: {}", event_id, e);
            failure(e)
        }
    }
}

/// Join a meeting from the web client
pub async fn join_meeting(
    State(state): State<AppState>,
    Json(req): Json<JoinMeetingRequest>,
) -> ApiResult<JoinMeetingResponse> {
    info!("API: Web join for event {}", req.event_id);

    // an unparseable passcode cannot match any session
    let passcode = match Passcode::parse(&req.meeting_passcode) {
        Ok(passcode) => passcode,
        Err(_) => {
            return failure(DomainError::NotFound(format!(
                "session for event {}",
                req.event_id
            )))
        }
    };

    let result = state
        .meetings
        .join_web(
            &EventId::new(req.event_id.as_str()),
            &passcode,
            &PhoneNumber::new(req.phone_number.as_str()),
        )
        .await;

    match result {
        Ok(join) => (StatusCode::OK, Json(ApiResponse::success(join.into()))),
        Err(e) => {
            warn!("API: Web join for event {} failed: {}", req.event_id, e);
            failure(e)
        }
    }
}

/// Sessions bound to a meeting
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(meeting_id): Path<String>,
) -> ApiResult<Vec<SessionResponse>> {
    info!("API: Querying meeting {}", meeting_id);

    match state.meetings.query_meeting(&MeetingId::new(meeting_id)).await {
        Ok(records) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                records.into_iter().map(Into::into).collect(),
            )),
        ),
        Err(e) => failure(e),
    }
}

/// End a meeting
pub async fn end_meeting(
    State(state): State<AppState>,
    Json(req): Json<EndMeetingRequest>,
) -> ApiResult<&'static str> {
    if req.meeting_id.is_empty() {
        return failure(DomainError::NotFound("meeting id not provided".to_string()));
    }

    info!("API: Ending meeting {}", req.meeting_id);
    match state.meetings.end_meeting(&MeetingId::new(req.meeting_id.as_str())).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::success("Meeting ended"))),
        Err(e) => {
            error!("API: Failed to end meeting {}: {}", req.meeting_id, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error(e.to_string())),
            )
        }
    }
}

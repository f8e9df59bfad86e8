//! Meeting API DTOs (Data Transfer Objects)

use crate::application::{IssuedPasscode, NewParticipant, WebJoin};
use crate::domain::session::SessionRecord;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::PhoneNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Participant entry of a batch create request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRequest {
    pub name: String,
    pub phone_number: String,
    /// Accepted for compatibility; no notification is sent
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub call_participant: bool,
}

/// Create meeting request.
///
/// Either `participants` (batch) or the `attendee*` fields (single) must be
/// present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    pub event_id: String,
    #[serde(default)]
    pub participants: Option<Vec<ParticipantRequest>>,
    #[serde(default)]
    pub attendee_name: Option<String>,
    #[serde(default)]
    pub attendee_phone_number: Option<String>,
    #[serde(default)]
    pub attendee_email: Option<String>,
    #[serde(default)]
    pub attendee_call: bool,
}

impl CreateMeetingRequest {
    pub fn is_batch(&self) -> bool {
        self.participants.is_some()
    }

    pub fn into_participants(self) -> Result<Vec<NewParticipant>, DomainError> {
        if self.event_id.is_empty() {
            return Err(DomainError::ValidationError("eventId is required".to_string()));
        }

        if let Some(participants) = self.participants {
            return participants
                .into_iter()
                .map(|p| participant(p.name, p.phone_number, p.call_participant))
                .collect();
        }

        match (self.attendee_name, self.attendee_phone_number) {
            (Some(name), Some(phone)) => Ok(vec![participant(name, phone, self.attendee_call)?]),
            _ => Err(DomainError::ValidationError(
                "participants or attendeeName and attendeePhoneNumber are required".to_string(),
            )),
        }
    }
}

fn participant(name: String, phone: String, call: bool) -> Result<NewParticipant, DomainError> {
    if phone.is_empty() {
        return Err(DomainError::ValidationError(format!(
            "phone number missing for participant '{}'",
            name
        )));
    }
    Ok(NewParticipant {
        name,
        phone_number: PhoneNumber::new(phone),
        call_participant: call,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasscodeResponse {
    pub phone_number: String,
    pub passcode: String,
    pub meeting_id: String,
}

impl From<IssuedPasscode> for PasscodeResponse {
    fn from(issued: IssuedPasscode) -> Self {
        Self {
            phone_number: issued.phone_number.into_inner(),
            passcode: issued.passcode.as_str().to_string(),
            meeting_id: issued.meeting_id.into_inner(),
        }
    }
}

/// Single passcode, or one entry per participant for a batch
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CreateMeetingResponse {
    Single { passcode: String },
    Batch { passcodes: Vec<PasscodeResponse> },
}

/// Web join request, field names as sent by the web client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JoinMeetingRequest {
    pub event_id: String,
    pub meeting_passcode: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinMeetingResponse {
    pub event_id: String,
    pub meeting_id: String,
    pub attendee_id: String,
    pub join_token: String,
}

impl From<WebJoin> for JoinMeetingResponse {
    fn from(join: WebJoin) -> Self {
        Self {
            event_id: join.event_id.into_inner(),
            meeting_id: join.credentials.meeting_id.into_inner(),
            attendee_id: join.credentials.attendee_id.into_inner(),
            join_token: join.credentials.join_token.into_inner(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndMeetingRequest {
    #[serde(default)]
    pub meeting_id: String,
}

/// Session record as exposed by the query endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub event_id: String,
    pub meeting_passcode: String,
    pub phone_number: String,
    pub name: String,
    pub join_method: Option<String>,
    pub meeting_id: Option<String>,
    pub attendee_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionRecord> for SessionResponse {
    fn from(record: SessionRecord) -> Self {
        Self {
            event_id: record.event_id.into_inner(),
            meeting_passcode: record.passcode.as_str().to_string(),
            phone_number: record.phone_number.into_inner(),
            name: record.name,
            join_method: record.join_method.map(|m| m.as_str().to_string()),
            meeting_id: record.meeting_id.map(|m| m.into_inner()),
            attendee_id: record.attendee_id.map(|a| a.into_inner()),
            expires_at: record.expires_at,
        }
    }
}

/// Generic API response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

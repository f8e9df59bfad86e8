//! Session record entity

use crate::domain::shared::value_objects::{
    AttendeeId, EventId, JoinToken, MeetingId, Passcode, PhoneNumber,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Medium through which a participant joined the meeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinMethod {
    Web,
    Phone,
}

impl JoinMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinMethod::Web => "Web",
            JoinMethod::Phone => "Phone",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Web" => Some(JoinMethod::Web),
            "Phone" => Some(JoinMethod::Phone),
            _ => None,
        }
    }
}

impl fmt::Display for JoinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of a session record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub event_id: EventId,
    pub passcode: Passcode,
}

impl SessionKey {
    pub fn new(event_id: EventId, passcode: Passcode) -> Self {
        Self { event_id, passcode }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event_id, self.passcode)
    }
}

/// Binds one participant of a meeting event to a passcode.
///
/// Records are written by the meeting creation workflow and only ever
/// updated afterwards, when a participant joins by phone or web.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub event_id: EventId,
    pub passcode: Passcode,
    pub phone_number: PhoneNumber,
    pub name: String,
    pub join_method: Option<JoinMethod>,
    pub meeting_id: Option<MeetingId>,
    pub attendee_id: Option<AttendeeId>,
    pub join_token: Option<JoinToken>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        event_id: EventId,
        passcode: Passcode,
        phone_number: PhoneNumber,
        name: String,
        ttl: Duration,
    ) -> Self {
        Self {
            event_id,
            passcode,
            phone_number,
            name,
            join_method: None,
            meeting_id: None,
            attendee_id: None,
            join_token: None,
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn with_meeting(mut self, meeting_id: MeetingId) -> Self {
        self.meeting_id = Some(meeting_id);
        self
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.event_id.clone(), self.passcode.clone())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Overwrite the binding fields; repeated application is a no-op
    pub fn apply(&mut self, binding: &SessionBinding) {
        self.join_method = Some(binding.join_method);
        self.meeting_id = Some(binding.meeting_id.clone());
        self.attendee_id = Some(binding.attendee_id.clone());
    }
}

/// Fields written when a participant joins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBinding {
    pub join_method: JoinMethod,
    pub meeting_id: MeetingId,
    pub attendee_id: AttendeeId,
}

//! Meeting value objects

use crate::domain::shared::value_objects::{AttendeeId, EventId, JoinToken, MeetingId, Passcode, PhoneNumber};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Credentials issued for one attendee of a meeting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingCredentials {
    pub meeting_id: MeetingId,
    pub attendee_id: AttendeeId,
    pub join_token: JoinToken,
}

/// Attendee as listed by the provisioning service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub attendee_id: AttendeeId,
    /// Phone number the attendee was provisioned for
    pub external_user_id: String,
}

/// Request to page a participant by phone.
///
/// The arguments are handed back to the call handler on the
/// `NEW_OUTBOUND_CALL` event for the resulting leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    pub to: PhoneNumber,
    pub event_id: EventId,
    pub passcode: Passcode,
    pub credentials: MeetingCredentials,
}

impl OutboundCall {
    pub fn arguments(&self) -> HashMap<String, String> {
        HashMap::from([
            ("meeting_id".to_string(), self.credentials.meeting_id.to_string()),
            ("attendee_id".to_string(), self.credentials.attendee_id.to_string()),
            ("join_token".to_string(), self.credentials.join_token.to_string()),
            ("event_id".to_string(), self.event_id.to_string()),
            ("meeting_passcode".to_string(), self.passcode.to_string()),
            ("phone_number".to_string(), self.to.to_string()),
        ])
    }
}

//! Transaction attributes
//!
//! The telephony platform echoes this bag back on every event of a call, so
//! it is the only state a call carries between invocations.

use super::event::OutboundArguments;
use crate::domain::meeting::MeetingCredentials;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{
    AttendeeId, EventId, JoinToken, MeetingId, Passcode, PhoneNumber,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<CallType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_passcode: Option<Passcode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_id: Option<MeetingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_id: Option<AttendeeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_token: Option<JoinToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumber>,
    /// Keys this handler does not own, passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl TransactionAttributes {
    pub fn require_call_type(&self) -> Result<CallType> {
        self.call_type.ok_or_else(|| DomainError::malformed("call_type"))
    }

    pub fn require_event_id(&self) -> Result<&EventId> {
        self.event_id.as_ref().ok_or_else(|| DomainError::malformed("event_id"))
    }

    pub fn require_passcode(&self) -> Result<&Passcode> {
        self.meeting_passcode
            .as_ref()
            .ok_or_else(|| DomainError::malformed("meeting_passcode"))
    }

    pub fn require_meeting_id(&self) -> Result<&MeetingId> {
        self.meeting_id.as_ref().ok_or_else(|| DomainError::malformed("meeting_id"))
    }

    pub fn require_attendee_id(&self) -> Result<&AttendeeId> {
        self.attendee_id.as_ref().ok_or_else(|| DomainError::malformed("attendee_id"))
    }

    pub fn require_join_token(&self) -> Result<&JoinToken> {
        self.join_token.as_ref().ok_or_else(|| DomainError::malformed("join_token"))
    }

    /// Meeting and attendee this leg is bound to, if any
    pub fn bound_attendee(&self) -> Option<(&MeetingId, &AttendeeId)> {
        self.meeting_id.as_ref().zip(self.attendee_id.as_ref())
    }

    /// Seed the bag of an outbound leg from the dial arguments
    pub fn apply_outbound(&mut self, arguments: OutboundArguments) {
        self.call_type = Some(CallType::Outbound);
        self.meeting_id = Some(arguments.meeting_id);
        self.attendee_id = Some(arguments.attendee_id);
        self.join_token = Some(arguments.join_token);
        self.event_id = Some(arguments.event_id);
        self.meeting_passcode = Some(arguments.meeting_passcode);
        if arguments.phone_number.is_some() {
            self.phone_number = arguments.phone_number;
        }
    }

    /// Record the attendee a passcode resolved to
    pub fn apply_credentials(
        &mut self,
        event_id: EventId,
        passcode: Passcode,
        phone_number: PhoneNumber,
        credentials: MeetingCredentials,
    ) {
        self.event_id = Some(event_id);
        self.meeting_passcode = Some(passcode);
        self.phone_number = Some(phone_number);
        self.meeting_id = Some(credentials.meeting_id);
        self.attendee_id = Some(credentials.attendee_id);
        self.join_token = Some(credentials.join_token);
    }
}

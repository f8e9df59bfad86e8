//! Telephony events as seen by the call-control state machine

use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{
    AttendeeId, EventId, JoinToken, MeetingId, Passcode, PhoneNumber,
};
use std::collections::HashMap;
use std::fmt;

/// Platform action kinds an action result can refer to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    SpeakAndGetDigits,
    Speak,
    Hangup,
    JoinMeeting,
    Other(String),
}

impl ActionKind {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "SpeakAndGetDigits" => ActionKind::SpeakAndGetDigits,
            "Speak" => ActionKind::Speak,
            "Hangup" => ActionKind::Hangup,
            "JoinChimeMeeting" => ActionKind::JoinMeeting,
            other => ActionKind::Other(other.to_string()),
        }
    }
}

/// Arguments the dial request attached to an outbound leg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundArguments {
    pub meeting_id: MeetingId,
    pub attendee_id: AttendeeId,
    pub join_token: JoinToken,
    pub event_id: EventId,
    pub meeting_passcode: Passcode,
    pub phone_number: Option<PhoneNumber>,
}

impl OutboundArguments {
    pub fn from_map(arguments: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &str| {
            arguments
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or_else(|| DomainError::malformed(key))
        };

        let meeting_passcode = Passcode::parse(&required("meeting_passcode")?)
            .map_err(|e| DomainError::MalformedEvent(e.to_string()))?;

        Ok(Self {
            meeting_id: MeetingId::new(required("meeting_id")?),
            attendee_id: AttendeeId::new(required("attendee_id")?),
            join_token: JoinToken::new(required("join_token")?),
            event_id: EventId::new(required("event_id")?),
            meeting_passcode,
            phone_number: arguments.get("phone_number").map(|p| PhoneNumber::new(p.as_str())),
        })
    }
}

/// One telephony signaling event.
///
/// The platform's (event type, action type) pairs are flattened into a closed
/// set so the state machine matches exhaustively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEvent {
    NewInboundCall,
    NewOutboundCall(OutboundArguments),
    CallAnswered,
    DigitsReceived(String),
    DigitCollectionFailed { error_type: Option<String> },
    MeetingJoined,
    MeetingJoinFailed { error_type: Option<String> },
    ActionCompleted(ActionKind),
    ActionFailed { action: ActionKind, error_type: Option<String> },
    Hangup,
    Unsupported(String),
}

impl CallEvent {
    pub fn name(&self) -> &'static str {
        match self {
            CallEvent::NewInboundCall => "new_inbound_call",
            CallEvent::NewOutboundCall(_) => "new_outbound_call",
            CallEvent::CallAnswered => "call_answered",
            CallEvent::DigitsReceived(_) => "digits_received",
            CallEvent::DigitCollectionFailed { .. } => "digit_collection_failed",
            CallEvent::MeetingJoined => "meeting_joined",
            CallEvent::MeetingJoinFailed { .. } => "meeting_join_failed",
            CallEvent::ActionCompleted(_) => "action_completed",
            CallEvent::ActionFailed { .. } => "action_failed",
            CallEvent::Hangup => "hangup",
            CallEvent::Unsupported(_) => "unsupported",
        }
    }
}

impl fmt::Display for CallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

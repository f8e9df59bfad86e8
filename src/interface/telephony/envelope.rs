//! Telephony platform invocation envelopes

use crate::domain::call_control::{
    Action, ActionKind, CallEvent, OutboundArguments, TransactionAttributes,
};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::CallLegId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const SCHEMA_VERSION: &str = "1.0";

/// Event posted by the platform for every signaling step of a call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationEvent {
    pub invocation_event_type: String,
    pub call_details: CallDetails,
    #[serde(default)]
    pub action_data: Option<ActionData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallDetails {
    pub transaction_id: String,
    #[serde(default)]
    pub transaction_attributes: Option<TransactionAttributes>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Participant {
    pub call_id: CallLegId,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
}

/// Result of the action the previous response asked for
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionData {
    #[serde(rename = "Type")]
    pub action_type: String,
    #[serde(default)]
    pub received_digits: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub parameters: Option<ActionParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionParameters {
    #[serde(default)]
    pub arguments: Option<HashMap<String, String>>,
}

impl InvocationEvent {
    /// Leg the response actions apply to
    pub fn call_leg(&self) -> Result<&CallLegId> {
        self.call_details
            .participants
            .first()
            .map(|p| &p.call_id)
            .ok_or_else(|| DomainError::malformed("CallDetails.Participants"))
    }

    pub fn transaction_id(&self) -> &str {
        &self.call_details.transaction_id
    }

    /// Attribute bag as echoed, or an empty one on the first event of a call
    pub fn attributes(&self) -> TransactionAttributes {
        self.call_details
            .transaction_attributes
            .clone()
            .unwrap_or_default()
    }

    fn require_action_data(&self) -> Result<&ActionData> {
        self.action_data
            .as_ref()
            .ok_or_else(|| DomainError::malformed("ActionData"))
    }

    /// Collapse (event type, action type) into a single call event
    pub fn to_call_event(&self) -> Result<CallEvent> {
        let event = match self.invocation_event_type.as_str() {
            "NEW_INBOUND_CALL" => CallEvent::NewInboundCall,
            "NEW_OUTBOUND_CALL" => {
                let empty = HashMap::new();
                let arguments = self
                    .action_data
                    .as_ref()
                    .and_then(|data| data.parameters.as_ref())
                    .and_then(|parameters| parameters.arguments.as_ref())
                    .unwrap_or(&empty);
                CallEvent::NewOutboundCall(OutboundArguments::from_map(arguments)?)
            }
            "CALL_ANSWERED" => CallEvent::CallAnswered,
            "ACTION_SUCCESSFUL" => {
                let data = self.require_action_data()?;
                match ActionKind::from_wire(&data.action_type) {
                    ActionKind::SpeakAndGetDigits => {
                        let digits = data
                            .received_digits
                            .clone()
                            .ok_or_else(|| DomainError::malformed("ActionData.ReceivedDigits"))?;
                        CallEvent::DigitsReceived(digits)
                    }
                    ActionKind::JoinMeeting => CallEvent::MeetingJoined,
                    other => CallEvent::ActionCompleted(other),
                }
            }
            "ACTION_FAILED" => {
                let data = self.require_action_data()?;
                let error_type = data.error_type.clone();
                match ActionKind::from_wire(&data.action_type) {
                    ActionKind::SpeakAndGetDigits => CallEvent::DigitCollectionFailed { error_type },
                    ActionKind::JoinMeeting => CallEvent::MeetingJoinFailed { error_type },
                    action => CallEvent::ActionFailed { action, error_type },
                }
            }
            "HANGUP" => CallEvent::Hangup,
            other => CallEvent::Unsupported(other.to_string()),
        };
        Ok(event)
    }
}

/// Reply to one invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationResponse {
    pub schema_version: &'static str,
    pub actions: Vec<Action>,
    pub transaction_attributes: TransactionAttributes,
}

impl InvocationResponse {
    pub fn new(actions: Vec<Action>, transaction_attributes: TransactionAttributes) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            actions,
            transaction_attributes,
        }
    }
}

//! Call-control state machine
//!
//! Every telephony event of a call is handled by a fresh invocation. The
//! state of the call is reconstructed from the event kind plus the
//! transaction attributes echoed by the platform:
//!
//! ```text
//! inbound:  NEW_INBOUND_CALL -> collect event id -> collect passcode
//!           -> (session found) bind + JoinMeeting -> "joined"
//!           -> (no session)    "invalid passcode" + Hangup
//! outbound: NEW_OUTBOUND_CALL -> CALL_ANSWERED -> collect 1/2
//!           -> "1": bind + JoinMeeting -> "joined"
//!           -> other: "disconnecting" + Hangup
//! any leg:  HANGUP -> remove attendee, remove empty meeting
//! ```

use super::action::{Action, Speech, VoiceParams};
use super::attributes::{CallType, TransactionAttributes};
use super::context::InvocationContext;
use super::event::CallEvent;
use super::prompts;
use crate::domain::meeting::{replace_attendee, MeetingProvisioning};
use crate::domain::session::{JoinMethod, SessionBinding, SessionDirectory};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{AttendeeId, EventId, MeetingId, Passcode};
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Actions for the platform plus the bag to echo back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub actions: Vec<Action>,
    pub attributes: TransactionAttributes,
}

/// Caller-side failures that end the call with an explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    InvalidPasscode,
    Declined,
    JoinFailed,
    DigitsExhausted,
}

impl Rejection {
    fn message(self) -> Option<&'static str> {
        match self {
            Rejection::InvalidPasscode => Some(prompts::INVALID_PASSCODE),
            Rejection::Declined => Some(prompts::DISCONNECTING),
            Rejection::JoinFailed => Some(prompts::JOIN_FAILED),
            Rejection::DigitsExhausted => None,
        }
    }

    fn actions(self, ctx: &InvocationContext, voice: &VoiceParams) -> Vec<Action> {
        let mut actions = Vec::with_capacity(2);
        if let Some(message) = self.message() {
            actions.push(Action::speak(ctx.call_leg(), Speech::text(voice, message)));
        }
        actions.push(Action::hangup(ctx.call_leg()));
        actions
    }
}

enum Fault {
    Rejected(Rejection),
    Fatal(DomainError),
}

impl From<DomainError> for Fault {
    fn from(error: DomainError) -> Self {
        Fault::Fatal(error)
    }
}

type Step = std::result::Result<Vec<Action>, Fault>;

pub struct CallControl {
    sessions: Arc<dyn SessionDirectory>,
    meetings: Arc<dyn MeetingProvisioning>,
    voice: VoiceParams,
}

impl CallControl {
    pub fn new(
        sessions: Arc<dyn SessionDirectory>,
        meetings: Arc<dyn MeetingProvisioning>,
        voice: VoiceParams,
    ) -> Self {
        Self {
            sessions,
            meetings,
            voice,
        }
    }

    /// Decide the actions for one event.
    ///
    /// Caller mistakes come back as spoken actions; an `Err` means the
    /// invocation itself failed and no response should be sent.
    pub async fn handle(
        &self,
        ctx: &InvocationContext,
        event: CallEvent,
        mut attributes: TransactionAttributes,
    ) -> Result<Transition> {
        debug!(transaction_id = %ctx.transaction_id(), "handling {}", event);

        let step = match event {
            CallEvent::NewInboundCall => Ok(self.on_new_inbound(&mut attributes)),
            CallEvent::NewOutboundCall(arguments) => {
                info!(transaction_id = %ctx.transaction_id(), "outbound leg for event {}", arguments.event_id);
                attributes.apply_outbound(arguments);
                Ok(Vec::new())
            }
            CallEvent::CallAnswered => self.on_answered(&attributes),
            CallEvent::DigitsReceived(digits) => match attributes.require_call_type()? {
                CallType::Outbound => self.on_join_choice(ctx, &attributes, &digits).await,
                CallType::Inbound => self.on_inbound_digits(ctx, &mut attributes, &digits).await,
            },
            CallEvent::DigitCollectionFailed { error_type } => {
                info!(transaction_id = %ctx.transaction_id(), ?error_type, "digit collection failed");
                Err(Fault::Rejected(Rejection::DigitsExhausted))
            }
            CallEvent::MeetingJoined => Ok(vec![Action::speak(
                ctx.call_leg(),
                Speech::text(&self.voice, prompts::JOINED),
            )]),
            CallEvent::MeetingJoinFailed { error_type } => {
                warn!(transaction_id = %ctx.transaction_id(), ?error_type, "platform could not join the meeting");
                Err(Fault::Rejected(Rejection::JoinFailed))
            }
            CallEvent::Hangup => {
                self.on_hangup(ctx, &attributes).await;
                Ok(Vec::new())
            }
            CallEvent::ActionCompleted(_)
            | CallEvent::ActionFailed { .. }
            | CallEvent::Unsupported(_) => Ok(Vec::new()),
        };

        match step {
            Ok(actions) => Ok(Transition { actions, attributes }),
            Err(Fault::Rejected(rejection)) => {
                info!(transaction_id = %ctx.transaction_id(), ?rejection, "ending call");
                Ok(Transition {
                    actions: rejection.actions(ctx, &self.voice),
                    attributes,
                })
            }
            Err(Fault::Fatal(error)) => Err(error),
        }
    }

    fn on_new_inbound(&self, attributes: &mut TransactionAttributes) -> Vec<Action> {
        attributes.call_type = Some(CallType::Inbound);
        vec![Action::collect_digits(prompts::six_digit_entry(
            &self.voice,
            prompts::EVENT_ID_PROMPT,
        ))]
    }

    fn on_answered(&self, attributes: &TransactionAttributes) -> Step {
        match attributes.call_type {
            Some(CallType::Outbound) => {
                let event_id = attributes.require_event_id()?;
                Ok(vec![Action::collect_digits(prompts::join_choice(
                    &self.voice,
                    event_id,
                ))])
            }
            _ => Ok(Vec::new()),
        }
    }

    async fn on_join_choice(
        &self,
        ctx: &InvocationContext,
        attributes: &TransactionAttributes,
        digits: &str,
    ) -> Step {
        if digits != prompts::ACCEPT_DIGIT {
            return Err(Fault::Rejected(Rejection::Declined));
        }

        let event_id = attributes.require_event_id()?;
        let passcode = attributes.require_passcode()?;
        let meeting_id = attributes.require_meeting_id()?;
        let attendee_id = attributes.require_attendee_id()?;
        let join_token = attributes.require_join_token()?;

        // The record may have expired or been purged since the call was placed
        match self.bind(ctx, event_id, passcode, meeting_id, attendee_id).await {
            Ok(()) => {}
            Err(DomainError::NotFound(_)) => {
                info!(transaction_id = %ctx.transaction_id(), "no session for event {}", event_id);
                return Err(Fault::Rejected(Rejection::InvalidPasscode));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(vec![Action::join_meeting(ctx.call_leg(), join_token, meeting_id)])
    }

    async fn on_inbound_digits(
        &self,
        ctx: &InvocationContext,
        attributes: &mut TransactionAttributes,
        digits: &str,
    ) -> Step {
        let Some(event_id) = attributes.event_id.clone() else {
            attributes.event_id = Some(EventId::new(digits));
            return Ok(vec![Action::collect_digits(prompts::six_digit_entry(
                &self.voice,
                prompts::PASSCODE_PROMPT,
            ))]);
        };

        let Ok(passcode) = Passcode::parse(digits) else {
            return Err(Fault::Rejected(Rejection::InvalidPasscode));
        };

        let Some(record) = self.sessions.get(&event_id, &passcode).await? else {
            info!(transaction_id = %ctx.transaction_id(), "no session for event {}", event_id);
            return Err(Fault::Rejected(Rejection::InvalidPasscode));
        };

        let credentials = replace_attendee(
            self.meetings.as_ref(),
            record.meeting_id.as_ref(),
            &record.event_id,
            &record.phone_number,
        )
        .await?;
        self.bind(
            ctx,
            &record.event_id,
            &record.passcode,
            &credentials.meeting_id,
            &credentials.attendee_id,
        )
        .await?;

        let action = Action::join_meeting(
            ctx.call_leg(),
            &credentials.join_token,
            &credentials.meeting_id,
        );
        attributes.apply_credentials(
            record.event_id,
            record.passcode,
            record.phone_number,
            credentials,
        );
        Ok(vec![action])
    }

    async fn bind(
        &self,
        ctx: &InvocationContext,
        event_id: &EventId,
        passcode: &Passcode,
        meeting_id: &MeetingId,
        attendee_id: &AttendeeId,
    ) -> Result<()> {
        let binding = SessionBinding {
            join_method: JoinMethod::Phone,
            meeting_id: meeting_id.clone(),
            attendee_id: attendee_id.clone(),
        };
        self.sessions.bind(event_id, passcode, &binding).await?;

        info!(
            transaction_id = %ctx.transaction_id(),
            "bound attendee {} of meeting {} to event {}", attendee_id, meeting_id, event_id
        );
        counter!("meeting_joins_total", "method" => JoinMethod::Phone.as_str()).increment(1);
        Ok(())
    }

    /// Best-effort removal of this leg's attendee and, once nobody is left,
    /// of the meeting. Failures are logged, never returned.
    async fn on_hangup(&self, ctx: &InvocationContext, attributes: &TransactionAttributes) {
        let Some((meeting_id, attendee_id)) = attributes.bound_attendee() else {
            debug!(transaction_id = %ctx.transaction_id(), "hangup without bound attendee");
            return;
        };

        match self.meetings.delete_attendee(meeting_id, attendee_id).await {
            Ok(()) => {
                info!(transaction_id = %ctx.transaction_id(), "deleted attendee {}", attendee_id);
                counter!("meeting_cleanups_total", "kind" => "attendee").increment(1);
            }
            Err(DomainError::NotFound(_)) => {
                debug!(transaction_id = %ctx.transaction_id(), "attendee {} already gone", attendee_id);
            }
            Err(e) => {
                warn!(transaction_id = %ctx.transaction_id(), "failed to delete attendee {}: {}", attendee_id, e);
                return;
            }
        }

        match self.meetings.list_attendees(meeting_id).await {
            Ok(remaining) if remaining.is_empty() => {
                match self.meetings.delete_meeting(meeting_id).await {
                    Ok(()) | Err(DomainError::NotFound(_)) => {
                        info!(transaction_id = %ctx.transaction_id(), "deleted empty meeting {}", meeting_id);
                        counter!("meeting_cleanups_total", "kind" => "meeting").increment(1);
                    }
                    Err(e) => {
                        warn!(transaction_id = %ctx.transaction_id(), "failed to delete meeting {}: {}", meeting_id, e);
                    }
                }
            }
            Ok(remaining) => {
                debug!(
                    transaction_id = %ctx.transaction_id(),
                    "{} attendees remain in meeting {}", remaining.len(), meeting_id
                );
            }
            Err(DomainError::NotFound(_)) => {}
            Err(e) => {
                warn!(transaction_id = %ctx.transaction_id(), "failed to list attendees of {}: {}", meeting_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call_control::event::OutboundArguments;
    use crate::domain::meeting::provisioning::MockMeetingProvisioning as MockMeetings;
    use crate::domain::meeting::{Attendee, MeetingCredentials};
    use crate::domain::session::repository::MockSessionDirectory as MockSessions;
    use crate::domain::session::SessionRecord;
    use crate::domain::shared::value_objects::{CallLegId, JoinToken, PhoneNumber};
    use chrono::Duration;
    use mockall::{predicate::*, Sequence};
    use serde_json::Value;

    fn ctx() -> InvocationContext {
        InvocationContext::new("txn-1", "test", CallLegId::new("leg-1"))
    }

    fn machine(sessions: MockSessions, meetings: MockMeetings) -> CallControl {
        CallControl::new(Arc::new(sessions), Arc::new(meetings), VoiceParams::default())
    }

    fn record() -> SessionRecord {
        SessionRecord::new(
            EventId::new("482913"),
            Passcode::parse("057321").unwrap(),
            PhoneNumber::new("+15551234567"),
            "Alice".to_string(),
            Duration::hours(24),
        )
        .with_meeting(MeetingId::new("meeting-1"))
    }

    fn credentials() -> MeetingCredentials {
        MeetingCredentials {
            meeting_id: MeetingId::new("meeting-1"),
            attendee_id: AttendeeId::new("attendee-2"),
            join_token: JoinToken::new("token-2"),
        }
    }

    fn outbound_attributes() -> TransactionAttributes {
        let mut attributes = TransactionAttributes::default();
        attributes.apply_outbound(OutboundArguments {
            meeting_id: MeetingId::new("meeting-1"),
            attendee_id: AttendeeId::new("attendee-1"),
            join_token: JoinToken::new("token-1"),
            event_id: EventId::new("482913"),
            meeting_passcode: Passcode::parse("057321").unwrap(),
            phone_number: Some(PhoneNumber::new("+15551234567")),
        });
        attributes
    }

    fn inbound_with_event_id() -> TransactionAttributes {
        TransactionAttributes {
            call_type: Some(CallType::Inbound),
            event_id: Some(EventId::new("482913")),
            ..Default::default()
        }
    }

    fn spoken_text(action: &Action) -> Option<String> {
        match action {
            Action::Speak(speak) => Some(speak.speech.text.clone()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_new_inbound_call_collects_event_id() {
        let machine = machine(MockSessions::new(), MockMeetings::new());

        let transition = machine
            .handle(&ctx(), CallEvent::NewInboundCall, TransactionAttributes::default())
            .await
            .unwrap();

        assert_eq!(transition.attributes.call_type, Some(CallType::Inbound));
        assert_eq!(transition.actions.len(), 1);
        match &transition.actions[0] {
            Action::SpeakAndGetDigits(collect) => {
                assert_eq!(collect.min_digits, 6);
                assert_eq!(collect.max_digits, 6);
                assert_eq!(collect.repeat, 3);
                assert_eq!(collect.speech_parameters.text, prompts::EVENT_ID_PROMPT);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_inbound_digits_become_event_id() {
        let machine = machine(MockSessions::new(), MockMeetings::new());
        let attributes = TransactionAttributes {
            call_type: Some(CallType::Inbound),
            ..Default::default()
        };

        let transition = machine
            .handle(&ctx(), CallEvent::DigitsReceived("482913".to_string()), attributes)
            .await
            .unwrap();

        assert_eq!(transition.attributes.event_id, Some(EventId::new("482913")));
        match &transition.actions[..] {
            [Action::SpeakAndGetDigits(collect)] => {
                assert_eq!(collect.speech_parameters.text, prompts::PASSCODE_PROMPT);
            }
            other => panic!("unexpected actions {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_passcode_speaks_and_hangs_up_without_provisioning() {
        let mut sessions = MockSessions::new();
        sessions.expect_get().times(1).returning(|_, _| Ok(None));
        sessions.expect_bind().never();

        let mut meetings = MockMeetings::new();
        meetings.expect_create_attendee().never();
        meetings.expect_list_attendees().never();

        let machine = machine(sessions, meetings);
        let attributes = inbound_with_event_id();

        let transition = machine
            .handle(&ctx(), CallEvent::DigitsReceived("111111".to_string()), attributes.clone())
            .await
            .unwrap();

        assert_eq!(transition.actions.len(), 2);
        assert_eq!(
            spoken_text(&transition.actions[0]).as_deref(),
            Some("Invalid meeting passcode.")
        );
        assert_eq!(transition.actions[1], Action::hangup(&CallLegId::new("leg-1")));
        assert_eq!(transition.attributes, attributes);
    }

    #[tokio::test]
    async fn test_passcode_replaces_existing_attendee_then_binds() {
        let mut seq = Sequence::new();
        let mut sessions = MockSessions::new();
        let mut meetings = MockMeetings::new();

        sessions
            .expect_get()
            .withf(|event_id, passcode| {
                event_id.as_str() == "482913" && passcode.as_str() == "057321"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(Some(record())));
        meetings
            .expect_list_attendees()
            .with(eq(MeetingId::new("meeting-1")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(vec![
                    Attendee {
                        attendee_id: AttendeeId::new("attendee-old"),
                        external_user_id: "+15551234567".to_string(),
                    },
                    Attendee {
                        attendee_id: AttendeeId::new("attendee-other"),
                        external_user_id: "+15559876543".to_string(),
                    },
                ])
            });
        meetings
            .expect_delete_attendee()
            .with(eq(MeetingId::new("meeting-1")), eq(AttendeeId::new("attendee-old")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        meetings
            .expect_create_attendee()
            .with(eq(EventId::new("482913")), eq(PhoneNumber::new("+15551234567")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(credentials()));
        sessions
            .expect_bind()
            .withf(|_, _, binding| {
                binding.join_method == JoinMethod::Phone
                    && binding.attendee_id == AttendeeId::new("attendee-2")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let machine = machine(sessions, meetings);
        let transition = machine
            .handle(
                &ctx(),
                CallEvent::DigitsReceived("057321".to_string()),
                inbound_with_event_id(),
            )
            .await
            .unwrap();

        assert_eq!(
            transition.actions,
            vec![Action::join_meeting(
                &CallLegId::new("leg-1"),
                &JoinToken::new("token-2"),
                &MeetingId::new("meeting-1"),
            )]
        );

        let attributes = transition.attributes;
        assert_eq!(attributes.meeting_id, Some(MeetingId::new("meeting-1")));
        assert_eq!(attributes.attendee_id, Some(AttendeeId::new("attendee-2")));
        assert_eq!(attributes.join_token, Some(JoinToken::new("token-2")));
        assert_eq!(attributes.meeting_passcode.unwrap().as_str(), "057321");
        assert_eq!(attributes.phone_number, Some(PhoneNumber::new("+15551234567")));
    }

    #[tokio::test]
    async fn test_session_lookup_failure_is_fatal() {
        let mut sessions = MockSessions::new();
        sessions
            .expect_get()
            .returning(|_, _| Err(DomainError::Collaborator("table unavailable".to_string())));

        let machine = machine(sessions, MockMeetings::new());
        let result = machine
            .handle(
                &ctx(),
                CallEvent::DigitsReceived("057321".to_string()),
                inbound_with_event_id(),
            )
            .await;

        assert!(matches!(result, Err(DomainError::Collaborator(_))));
    }

    #[tokio::test]
    async fn test_provisioning_failure_is_fatal_and_nothing_is_bound() {
        let mut sessions = MockSessions::new();
        sessions.expect_get().returning(|_, _| Ok(Some(record())));
        sessions.expect_bind().never();

        let mut meetings = MockMeetings::new();
        meetings.expect_list_attendees().returning(|_| Ok(Vec::new()));
        meetings
            .expect_create_attendee()
            .returning(|_, _| Err(DomainError::Collaborator("throttled".to_string())));

        let machine = machine(sessions, meetings);
        let result = machine
            .handle(
                &ctx(),
                CallEvent::DigitsReceived("057321".to_string()),
                inbound_with_event_id(),
            )
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_outbound_call_copies_arguments() {
        let machine = machine(MockSessions::new(), MockMeetings::new());
        let arguments = OutboundArguments {
            meeting_id: MeetingId::new("meeting-1"),
            attendee_id: AttendeeId::new("attendee-1"),
            join_token: JoinToken::new("token-1"),
            event_id: EventId::new("482913"),
            meeting_passcode: Passcode::parse("057321").unwrap(),
            phone_number: Some(PhoneNumber::new("+15551234567")),
        };

        let transition = machine
            .handle(
                &ctx(),
                CallEvent::NewOutboundCall(arguments),
                TransactionAttributes::default(),
            )
            .await
            .unwrap();

        assert!(transition.actions.is_empty());
        assert_eq!(transition.attributes, outbound_attributes());
    }

    #[tokio::test]
    async fn test_answered_outbound_call_offers_join_choice() {
        let machine = machine(MockSessions::new(), MockMeetings::new());

        let transition = machine
            .handle(&ctx(), CallEvent::CallAnswered, outbound_attributes())
            .await
            .unwrap();

        let value: Value = serde_json::to_value(&transition.actions).unwrap();
        assert_eq!(value[0]["Type"], "SpeakAndGetDigits");
        assert_eq!(value[0]["Parameters"]["MaxNumberOfDigits"], 1);
        assert!(value[0]["Parameters"]["SpeechParameters"]["Text"]
            .as_str()
            .unwrap()
            .contains("482913"));
    }

    #[tokio::test]
    async fn test_answered_inbound_call_does_nothing() {
        let machine = machine(MockSessions::new(), MockMeetings::new());
        let transition = machine
            .handle(&ctx(), CallEvent::CallAnswered, inbound_with_event_id())
            .await
            .unwrap();
        assert!(transition.actions.is_empty());
    }

    #[tokio::test]
    async fn test_outbound_accept_binds_phone_and_joins() {
        let mut sessions = MockSessions::new();
        sessions
            .expect_bind()
            .withf(|event_id, passcode, binding| {
                event_id.as_str() == "482913"
                    && passcode.as_str() == "057321"
                    && *binding
                        == SessionBinding {
                            join_method: JoinMethod::Phone,
                            meeting_id: MeetingId::new("meeting-1"),
                            attendee_id: AttendeeId::new("attendee-1"),
                        }
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let machine = machine(sessions, MockMeetings::new());
        let attributes = outbound_attributes();
        let transition = machine
            .handle(&ctx(), CallEvent::DigitsReceived("1".to_string()), attributes.clone())
            .await
            .unwrap();

        assert_eq!(
            transition.actions,
            vec![Action::join_meeting(
                &CallLegId::new("leg-1"),
                &JoinToken::new("token-1"),
                &MeetingId::new("meeting-1"),
            )]
        );
        assert_eq!(transition.attributes, attributes);
    }

    #[tokio::test]
    async fn test_outbound_accept_without_session_is_invalid_passcode() {
        let mut sessions = MockSessions::new();
        sessions
            .expect_bind()
            .times(1)
            .returning(|_, _, _| Err(DomainError::NotFound("session 482913/057321".to_string())));

        let machine = machine(sessions, MockMeetings::new());
        let transition = machine
            .handle(&ctx(), CallEvent::DigitsReceived("1".to_string()), outbound_attributes())
            .await
            .unwrap();

        assert_eq!(transition.actions.len(), 2);
        assert_eq!(
            spoken_text(&transition.actions[0]).as_deref(),
            Some("Invalid meeting passcode.")
        );
        assert_eq!(transition.actions[1], Action::hangup(&CallLegId::new("leg-1")));
    }

    #[tokio::test]
    async fn test_outbound_accept_bind_failure_is_fatal() {
        let mut sessions = MockSessions::new();
        sessions
            .expect_bind()
            .returning(|_, _, _| Err(DomainError::Collaborator("table unavailable".to_string())));

        let machine = machine(sessions, MockMeetings::new());
        let result = machine
            .handle(&ctx(), CallEvent::DigitsReceived("1".to_string()), outbound_attributes())
            .await;

        assert!(matches!(result, Err(DomainError::Collaborator(_))));
    }

    #[tokio::test]
    async fn test_outbound_decline_disconnects() {
        let mut sessions = MockSessions::new();
        sessions.expect_bind().never();

        let machine = machine(sessions, MockMeetings::new());
        let transition = machine
            .handle(&ctx(), CallEvent::DigitsReceived("2".to_string()), outbound_attributes())
            .await
            .unwrap();

        assert_eq!(transition.actions.len(), 2);
        assert_eq!(spoken_text(&transition.actions[0]).as_deref(), Some("Disconnecting you."));
        assert_eq!(transition.actions[1], Action::hangup(&CallLegId::new("leg-1")));
    }

    #[tokio::test]
    async fn test_digits_without_call_type_are_malformed() {
        let machine = machine(MockSessions::new(), MockMeetings::new());
        let result = machine
            .handle(
                &ctx(),
                CallEvent::DigitsReceived("1".to_string()),
                TransactionAttributes::default(),
            )
            .await;
        assert_eq!(result.unwrap_err(), DomainError::malformed("call_type"));
    }

    #[tokio::test]
    async fn test_join_outcomes() {
        let machine = machine(MockSessions::new(), MockMeetings::new());

        let joined = machine
            .handle(&ctx(), CallEvent::MeetingJoined, outbound_attributes())
            .await
            .unwrap();
        assert_eq!(joined.actions.len(), 1);
        assert_eq!(
            spoken_text(&joined.actions[0]).as_deref(),
            Some("You have been joined to the meeting.")
        );

        let failed = machine
            .handle(
                &ctx(),
                CallEvent::MeetingJoinFailed { error_type: None },
                outbound_attributes(),
            )
            .await
            .unwrap();
        assert_eq!(failed.actions.len(), 2);
        assert_eq!(spoken_text(&failed.actions[0]).as_deref(), Some(prompts::JOIN_FAILED));
        assert!(matches!(failed.actions[1], Action::Hangup(_)));
    }

    #[tokio::test]
    async fn test_digit_collection_failure_hangs_up() {
        let machine = machine(MockSessions::new(), MockMeetings::new());
        let transition = machine
            .handle(
                &ctx(),
                CallEvent::DigitCollectionFailed {
                    error_type: Some("InvalidDigitsReceived".to_string()),
                },
                inbound_with_event_id(),
            )
            .await
            .unwrap();

        assert_eq!(transition.actions, vec![Action::hangup(&CallLegId::new("leg-1"))]);
    }

    #[tokio::test]
    async fn test_hangup_of_last_attendee_deletes_meeting() {
        let mut seq = Sequence::new();
        let mut meetings = MockMeetings::new();
        meetings
            .expect_delete_attendee()
            .with(eq(MeetingId::new("meeting-1")), eq(AttendeeId::new("attendee-1")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        meetings
            .expect_list_attendees()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Vec::new()));
        meetings
            .expect_delete_meeting()
            .with(eq(MeetingId::new("meeting-1")))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let machine = machine(MockSessions::new(), meetings);
        let transition = machine
            .handle(&ctx(), CallEvent::Hangup, outbound_attributes())
            .await
            .unwrap();

        assert!(transition.actions.is_empty());
    }

    #[tokio::test]
    async fn test_hangup_with_others_remaining_keeps_meeting() {
        let mut meetings = MockMeetings::new();
        meetings.expect_delete_attendee().times(1).returning(|_, _| Ok(()));
        meetings.expect_list_attendees().times(1).returning(|_| {
            Ok(vec![Attendee {
                attendee_id: AttendeeId::new("attendee-9"),
                external_user_id: "+15559876543".to_string(),
            }])
        });
        meetings.expect_delete_meeting().never();

        let machine = machine(MockSessions::new(), meetings);
        machine
            .handle(&ctx(), CallEvent::Hangup, outbound_attributes())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_hangup_cleanup_failure_is_swallowed() {
        let mut meetings = MockMeetings::new();
        meetings
            .expect_delete_attendee()
            .returning(|_, _| Err(DomainError::Collaborator("timeout".to_string())));
        meetings.expect_list_attendees().never();
        meetings.expect_delete_meeting().never();

        let machine = machine(MockSessions::new(), meetings);
        let transition = machine
            .handle(&ctx(), CallEvent::Hangup, outbound_attributes())
            .await
            .unwrap();
        assert!(transition.actions.is_empty());
    }

    #[tokio::test]
    async fn test_hangup_before_binding_touches_nothing() {
        let mut meetings = MockMeetings::new();
        meetings.expect_delete_attendee().never();

        let machine = machine(MockSessions::new(), meetings);
        machine
            .handle(&ctx(), CallEvent::Hangup, inbound_with_event_id())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_redelivered_event_gives_same_transition() {
        let mut sessions = MockSessions::new();
        sessions.expect_bind().times(2).returning(|_, _, _| Ok(()));

        let machine = machine(sessions, MockMeetings::new());
        let first = machine
            .handle(&ctx(), CallEvent::DigitsReceived("1".to_string()), outbound_attributes())
            .await
            .unwrap();
        let second = machine
            .handle(&ctx(), CallEvent::DigitsReceived("1".to_string()), outbound_attributes())
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_redelivered_passcode_keeps_one_attendee() {
        use crate::infrastructure::persistence::InMemorySessionDirectory;
        use crate::infrastructure::provisioning::InMemoryMeetingService;

        let sessions = InMemorySessionDirectory::new();
        let meetings = InMemoryMeetingService::new("us-east-1");
        let phone = PhoneNumber::new("+15551234567");
        let issued = meetings
            .create_attendee(&EventId::new("482913"), &phone)
            .await
            .unwrap();
        let mut stored = record().with_meeting(issued.meeting_id.clone());
        stored.attendee_id = Some(issued.attendee_id.clone());
        stored.join_token = Some(issued.join_token.clone());
        sessions.put(&stored).await.unwrap();

        let machine = CallControl::new(
            Arc::new(sessions.clone()),
            Arc::new(meetings.clone()),
            VoiceParams::default(),
        );
        let first = machine
            .handle(&ctx(), CallEvent::DigitsReceived("057321".to_string()), inbound_with_event_id())
            .await
            .unwrap();
        let second = machine
            .handle(&ctx(), CallEvent::DigitsReceived("057321".to_string()), inbound_with_event_id())
            .await
            .unwrap();

        for transition in [&first, &second] {
            assert!(matches!(&transition.actions[..], [Action::JoinMeeting(_)]));
        }

        let attendees = meetings.list_attendees(&issued.meeting_id).await.unwrap();
        assert_eq!(attendees.len(), 1);
        assert_eq!(attendees[0].external_user_id, phone.as_str());
        assert_eq!(attendees[0].attendee_id, second.attributes.attendee_id.clone().unwrap());

        // equivalent bags: same meeting and caller, fresh attendee credentials
        let (a, b) = (&first.attributes, &second.attributes);
        assert_eq!(a.call_type, b.call_type);
        assert_eq!(a.event_id, b.event_id);
        assert_eq!(a.meeting_passcode, b.meeting_passcode);
        assert_eq!(a.phone_number, b.phone_number);
        assert_eq!(a.meeting_id, b.meeting_id);
        assert_ne!(a.attendee_id, b.attendee_id);

        let bound = sessions
            .get(&EventId::new("482913"), &Passcode::parse("057321").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(bound.join_method, Some(JoinMethod::Phone));
        assert_eq!(bound.attendee_id, b.attendee_id);
    }
}

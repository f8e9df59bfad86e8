//! Meeting use cases outside the call flow: creation, web join, query, end

use crate::domain::meeting::{
    replace_attendee, MeetingCredentials, MeetingProvisioning, OutboundCall, OutboundDialer,
};
use crate::domain::session::{
    generate_passcode, JoinMethod, SessionBinding, SessionDirectory, SessionRecord,
};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{
    AttendeeId, EventId, MeetingId, Passcode, PhoneNumber, EVENT_ID_LEN,
};
use chrono::Duration;
use metrics::counter;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// Participant to add to a meeting event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParticipant {
    pub name: String,
    pub phone_number: PhoneNumber,
    /// Page the participant by phone once the session exists
    pub call_participant: bool,
}

/// Passcode issued to one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedPasscode {
    pub phone_number: PhoneNumber,
    pub passcode: Passcode,
    pub meeting_id: MeetingId,
}

/// Meeting and attendee handed to a web participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebJoin {
    pub event_id: EventId,
    pub credentials: MeetingCredentials,
}

/// Fresh draws tried before giving up on an event's passcode space
const PASSCODE_ATTEMPTS: usize = 8;

/// Reject a batch that cannot be issued before anything is provisioned
fn validate_batch(event_id: &EventId, participants: &[NewParticipant]) -> Result<()> {
    if participants.is_empty() {
        return Err(DomainError::ValidationError(
            "at least one participant is required".to_string(),
        ));
    }
    if !event_id.is_dialable() {
        return Err(DomainError::ValidationError(format!(
            "event id must be {} digits",
            EVENT_ID_LEN
        )));
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        if !seen.insert(participant.phone_number.as_str()) {
            return Err(DomainError::ValidationError(format!(
                "phone number {} listed more than once",
                participant.phone_number
            )));
        }
    }
    Ok(())
}

pub struct MeetingService {
    sessions: Arc<dyn SessionDirectory>,
    meetings: Arc<dyn MeetingProvisioning>,
    dialer: Arc<dyn OutboundDialer>,
    session_ttl: Duration,
}

impl MeetingService {
    pub fn new(
        sessions: Arc<dyn SessionDirectory>,
        meetings: Arc<dyn MeetingProvisioning>,
        dialer: Arc<dyn OutboundDialer>,
        session_ttl: Duration,
    ) -> Self {
        Self {
            sessions,
            meetings,
            dialer,
            session_ttl,
        }
    }

    /// Add participants to the event's meeting and issue each a passcode.
    ///
    /// All or nothing: if any participant cannot be provisioned, stored or
    /// paged, everything created for the batch is removed again. Pages go
    /// out only once every session record is stored, so the outbound leg
    /// always finds its record.
    pub async fn create_meeting(
        &self,
        event_id: &EventId,
        participants: Vec<NewParticipant>,
    ) -> Result<Vec<IssuedPasscode>> {
        validate_batch(event_id, &participants)?;

        let mut created = Vec::with_capacity(participants.len());
        match self.issue_all(event_id, participants, &mut created).await {
            Ok(issued) => Ok(issued),
            Err(e) => {
                warn!(
                    "Creating meeting for event {} failed, rolling back {} participants: {}",
                    event_id,
                    created.len(),
                    e
                );
                self.roll_back(&created).await;
                Err(e)
            }
        }
    }

    async fn issue_all(
        &self,
        event_id: &EventId,
        participants: Vec<NewParticipant>,
        created: &mut Vec<SessionRecord>,
    ) -> Result<Vec<IssuedPasscode>> {
        let mut issued = Vec::with_capacity(participants.len());
        let mut pages = Vec::new();

        for participant in participants {
            let credentials = self
                .meetings
                .create_attendee(event_id, &participant.phone_number)
                .await?;
            let passcode = match self.unused_passcode(event_id).await {
                Ok(passcode) => passcode,
                Err(e) => {
                    self.delete_attendee_quietly(&credentials.meeting_id, &credentials.attendee_id)
                        .await;
                    return Err(e);
                }
            };

            let mut record = SessionRecord::new(
                event_id.clone(),
                passcode.clone(),
                participant.phone_number.clone(),
                participant.name,
                self.session_ttl,
            )
            .with_meeting(credentials.meeting_id.clone());
            record.attendee_id = Some(credentials.attendee_id.clone());
            record.join_token = Some(credentials.join_token.clone());
            created.push(record.clone());
            self.sessions.put(&record).await?;

            info!(
                "Issued passcode for {} in meeting {} (event {})",
                participant.phone_number, credentials.meeting_id, event_id
            );

            if participant.call_participant {
                pages.push(OutboundCall {
                    to: participant.phone_number.clone(),
                    event_id: event_id.clone(),
                    passcode: passcode.clone(),
                    credentials: credentials.clone(),
                });
            }

            issued.push(IssuedPasscode {
                phone_number: participant.phone_number,
                passcode,
                meeting_id: credentials.meeting_id,
            });
        }

        for call in &pages {
            self.dialer.dial(call).await?;
        }

        Ok(issued)
    }

    /// Draw a passcode not yet held by a live record of the event
    async fn unused_passcode(&self, event_id: &EventId) -> Result<Passcode> {
        for _ in 0..PASSCODE_ATTEMPTS {
            let passcode = generate_passcode(&mut rand::thread_rng())?;
            if self.sessions.get(event_id, &passcode).await?.is_none() {
                return Ok(passcode);
            }
        }
        Err(DomainError::Internal(format!(
            "no free passcode for event {} after {} draws",
            event_id, PASSCODE_ATTEMPTS
        )))
    }

    /// Undo a partially created batch. Failures are logged and skipped.
    async fn roll_back(&self, created: &[SessionRecord]) {
        for record in created {
            if let Err(e) = self.sessions.remove(&record.event_id, &record.passcode).await {
                warn!("Failed to remove session {}: {}", record.key(), e);
            }
            if let (Some(meeting_id), Some(attendee_id)) = (&record.meeting_id, &record.attendee_id) {
                self.delete_attendee_quietly(meeting_id, attendee_id).await;
            }
        }

        let Some(meeting_id) = created.first().and_then(|r| r.meeting_id.as_ref()) else {
            return;
        };
        match self.meetings.list_attendees(meeting_id).await {
            Ok(remaining) if remaining.is_empty() => {
                if let Err(e) = self.meetings.delete_meeting(meeting_id).await {
                    warn!("Failed to delete meeting {}: {}", meeting_id, e);
                }
            }
            Ok(_) | Err(DomainError::NotFound(_)) => {}
            Err(e) => warn!("Failed to list attendees of {}: {}", meeting_id, e),
        }
    }

    async fn delete_attendee_quietly(&self, meeting_id: &MeetingId, attendee_id: &AttendeeId) {
        match self.meetings.delete_attendee(meeting_id, attendee_id).await {
            Ok(()) | Err(DomainError::NotFound(_)) => {}
            Err(e) => warn!("Failed to delete attendee {}: {}", attendee_id, e),
        }
    }

    /// Redeem a passcode from the web client
    pub async fn join_web(
        &self,
        event_id: &EventId,
        passcode: &Passcode,
        phone_number: &PhoneNumber,
    ) -> Result<WebJoin> {
        let record = self
            .sessions
            .get(event_id, passcode)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("session for event {}", event_id)))?;

        let credentials = replace_attendee(
            self.meetings.as_ref(),
            record.meeting_id.as_ref(),
            event_id,
            phone_number,
        )
        .await?;

        let binding = SessionBinding {
            join_method: JoinMethod::Web,
            meeting_id: credentials.meeting_id.clone(),
            attendee_id: credentials.attendee_id.clone(),
        };
        self.sessions.bind(event_id, passcode, &binding).await?;
        counter!("meeting_joins_total", "method" => JoinMethod::Web.as_str()).increment(1);

        info!("Web join for event {} bound to meeting {}", event_id, credentials.meeting_id);
        Ok(WebJoin {
            event_id: record.event_id,
            credentials,
        })
    }

    /// Session records bound to a meeting
    pub async fn query_meeting(&self, meeting_id: &MeetingId) -> Result<Vec<SessionRecord>> {
        let records = self.sessions.find_by_meeting(meeting_id).await?;
        if records.is_empty() {
            return Err(DomainError::NotFound(format!("meeting {}", meeting_id)));
        }
        Ok(records)
    }

    pub async fn end_meeting(&self, meeting_id: &MeetingId) -> Result<()> {
        if meeting_id.as_str().is_empty() {
            return Err(DomainError::NotFound("meeting id not provided".to_string()));
        }

        self.meetings.delete_meeting(meeting_id).await.map_err(|e| {
            warn!("Unable to delete meeting {}: {}", meeting_id, e);
            e
        })?;

        info!("Ended meeting {}", meeting_id);
        Ok(())
    }
}

//! In-memory meeting service and dialer

use crate::domain::meeting::{Attendee, MeetingCredentials, MeetingProvisioning, OutboundCall, OutboundDialer};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{AttendeeId, EventId, JoinToken, MeetingId, PhoneNumber};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

struct HostedAttendee {
    attendee_id: AttendeeId,
    external_user_id: String,
    join_token: JoinToken,
}

struct HostedMeeting {
    event_id: EventId,
    attendees: Vec<HostedAttendee>,
}

#[derive(Default)]
struct Meetings {
    by_id: HashMap<MeetingId, HostedMeeting>,
    by_event: HashMap<EventId, MeetingId>,
}

/// Meeting provisioning held in process memory.
///
/// Behaves like the hosted service on the points call control relies on:
/// one meeting per event id, and a duplicate external user id on the same
/// meeting is rejected.
#[derive(Clone)]
pub struct InMemoryMeetingService {
    media_region: String,
    meetings: Arc<RwLock<Meetings>>,
}

impl InMemoryMeetingService {
    pub fn new(media_region: impl Into<String>) -> Self {
        Self {
            media_region: media_region.into(),
            meetings: Arc::new(RwLock::new(Meetings::default())),
        }
    }

    pub async fn meeting_count(&self) -> usize {
        self.meetings.read().await.by_id.len()
    }

    pub async fn meeting_for_event(&self, event_id: &EventId) -> Option<MeetingId> {
        self.meetings.read().await.by_event.get(event_id).cloned()
    }
}

#[async_trait]
impl MeetingProvisioning for InMemoryMeetingService {
    async fn create_attendee(
        &self,
        event_id: &EventId,
        phone_number: &PhoneNumber,
    ) -> Result<MeetingCredentials> {
        let mut guard = self.meetings.write().await;
        let meetings = &mut *guard;

        let meeting_id = match meetings.by_event.get(event_id) {
            Some(id) => id.clone(),
            None => {
                let id = MeetingId::new(Uuid::new_v4().to_string());
                info!("Created meeting {} for event {} in {}", id, event_id, self.media_region);
                meetings.by_event.insert(event_id.clone(), id.clone());
                meetings.by_id.insert(
                    id.clone(),
                    HostedMeeting {
                        event_id: event_id.clone(),
                        attendees: Vec::new(),
                    },
                );
                id
            }
        };

        let meeting = meetings
            .by_id
            .get_mut(&meeting_id)
            .ok_or_else(|| DomainError::Internal(format!("meeting {} missing", meeting_id)))?;

        if meeting
            .attendees
            .iter()
            .any(|a| a.external_user_id == phone_number.as_str())
        {
            return Err(DomainError::Conflict(format!(
                "attendee {} already in meeting {}",
                phone_number, meeting_id
            )));
        }

        let attendee = HostedAttendee {
            attendee_id: AttendeeId::new(Uuid::new_v4().to_string()),
            external_user_id: phone_number.to_string(),
            join_token: JoinToken::new(Uuid::new_v4().simple().to_string()),
        };
        let credentials = MeetingCredentials {
            meeting_id: meeting_id.clone(),
            attendee_id: attendee.attendee_id.clone(),
            join_token: attendee.join_token.clone(),
        };
        meeting.attendees.push(attendee);

        debug!("Added attendee {} to meeting {}", credentials.attendee_id, meeting_id);
        Ok(credentials)
    }

    async fn list_attendees(&self, meeting_id: &MeetingId) -> Result<Vec<Attendee>> {
        let meetings = self.meetings.read().await;
        let meeting = meetings
            .by_id
            .get(meeting_id)
            .ok_or_else(|| DomainError::NotFound(format!("meeting {}", meeting_id)))?;

        Ok(meeting
            .attendees
            .iter()
            .map(|a| Attendee {
                attendee_id: a.attendee_id.clone(),
                external_user_id: a.external_user_id.clone(),
            })
            .collect())
    }

    async fn delete_attendee(&self, meeting_id: &MeetingId, attendee_id: &AttendeeId) -> Result<()> {
        let mut meetings = self.meetings.write().await;
        let meeting = meetings
            .by_id
            .get_mut(meeting_id)
            .ok_or_else(|| DomainError::NotFound(format!("meeting {}", meeting_id)))?;

        let before = meeting.attendees.len();
        meeting.attendees.retain(|a| &a.attendee_id != attendee_id);
        if meeting.attendees.len() == before {
            return Err(DomainError::NotFound(format!("attendee {}", attendee_id)));
        }
        Ok(())
    }

    async fn delete_meeting(&self, meeting_id: &MeetingId) -> Result<()> {
        let mut meetings = self.meetings.write().await;
        let meeting = meetings
            .by_id
            .remove(meeting_id)
            .ok_or_else(|| DomainError::NotFound(format!("meeting {}", meeting_id)))?;
        meetings.by_event.remove(&meeting.event_id);

        info!("Deleted meeting {}", meeting_id);
        Ok(())
    }
}

/// Dialer that only logs the calls it is asked to place
#[derive(Clone, Default)]
pub struct LoggingDialer {
    from_number: Option<PhoneNumber>,
}

impl LoggingDialer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller id presented on outbound legs
    pub fn with_from_number(mut self, from_number: PhoneNumber) -> Self {
        self.from_number = Some(from_number);
        self
    }
}

#[async_trait]
impl OutboundDialer for LoggingDialer {
    async fn dial(&self, call: &OutboundCall) -> Result<()> {
        match &self.from_number {
            Some(from) => info!(
                "Queued outbound call {} -> {} for event {}",
                from, call.to, call.event_id
            ),
            None => info!("Queued outbound call to {} for event {}", call.to, call.event_id),
        }
        Ok(())
    }
}

/// Dialer that keeps every requested call, for tests
#[derive(Clone, Default)]
pub struct RecordingDialer {
    placed: Arc<RwLock<Vec<OutboundCall>>>,
}

impl RecordingDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn placed_calls(&self) -> Vec<OutboundCall> {
        self.placed.read().await.clone()
    }
}

#[async_trait]
impl OutboundDialer for RecordingDialer {
    async fn dial(&self, call: &OutboundCall) -> Result<()> {
        debug!("Recorded outbound call to {} for event {}", call.to, call.event_id);
        self.placed.write().await.push(call.clone());
        Ok(())
    }
}

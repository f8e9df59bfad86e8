//! Meeting service ports

use super::entity::{Attendee, MeetingCredentials, OutboundCall};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{AttendeeId, EventId, MeetingId, PhoneNumber};
use async_trait::async_trait;

/// Provisioning service that hosts meetings and issues attendee credentials
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingProvisioning: Send + Sync {
    /// Create the event's meeting if needed and add an attendee for the number.
    ///
    /// Repeated calls for the same event id resolve to the same meeting.
    async fn create_attendee(
        &self,
        event_id: &EventId,
        phone_number: &PhoneNumber,
    ) -> Result<MeetingCredentials>;

    async fn list_attendees(&self, meeting_id: &MeetingId) -> Result<Vec<Attendee>>;

    async fn delete_attendee(&self, meeting_id: &MeetingId, attendee_id: &AttendeeId)
        -> Result<()>;

    async fn delete_meeting(&self, meeting_id: &MeetingId) -> Result<()>;
}

/// Telephony platform entry point for placing outbound calls
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutboundDialer: Send + Sync {
    async fn dial(&self, call: &OutboundCall) -> Result<()>;
}

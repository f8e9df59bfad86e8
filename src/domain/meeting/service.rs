//! Attendee create-or-replace

use super::entity::MeetingCredentials;
use super::provisioning::MeetingProvisioning;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{EventId, MeetingId, PhoneNumber};
use tracing::debug;

/// Provision a fresh attendee for `phone_number`.
///
/// Any attendee `meeting_id` already holds for the same number is deleted
/// first, so repeating the call never trips the service's duplicate
/// attendee check. A meeting that no longer exists is recreated by
/// `create_attendee`.
pub async fn replace_attendee(
    meetings: &dyn MeetingProvisioning,
    meeting_id: Option<&MeetingId>,
    event_id: &EventId,
    phone_number: &PhoneNumber,
) -> Result<MeetingCredentials> {
    if let Some(meeting_id) = meeting_id {
        let attendees = match meetings.list_attendees(meeting_id).await {
            Ok(attendees) => attendees,
            Err(DomainError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        for stale in attendees
            .iter()
            .filter(|a| a.external_user_id == phone_number.as_str())
        {
            debug!("Removing stale attendee {} from meeting {}", stale.attendee_id, meeting_id);
            meetings.delete_attendee(meeting_id, &stale.attendee_id).await?;
        }
    }

    meetings.create_attendee(event_id, phone_number).await
}

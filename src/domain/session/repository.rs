//! Session directory interface

use super::entity::{SessionBinding, SessionRecord};
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{EventId, MeetingId, Passcode};
use async_trait::async_trait;

/// Directory of session records keyed by (event id, passcode).
///
/// Defined in the domain layer as a port; implemented in the
/// infrastructure layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Find a live record. Expired records are reported as absent.
    async fn get(&self, event_id: &EventId, passcode: &Passcode) -> Result<Option<SessionRecord>>;

    /// Overwrite the join binding of an existing record
    async fn bind(
        &self,
        event_id: &EventId,
        passcode: &Passcode,
        binding: &SessionBinding,
    ) -> Result<()>;

    /// Insert or replace a record
    async fn put(&self, record: &SessionRecord) -> Result<()>;

    /// Delete a record; deleting an absent record is not an error
    async fn remove(&self, event_id: &EventId, passcode: &Passcode) -> Result<()>;

    /// Find live records by the secondary meeting id key
    async fn find_by_meeting(&self, meeting_id: &MeetingId) -> Result<Vec<SessionRecord>>;
}

//! In-memory session directory

use crate::domain::session::{SessionBinding, SessionDirectory, SessionKey, SessionRecord};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{EventId, MeetingId, Passcode};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Session directory held in process memory, for local runs and tests
#[derive(Clone, Default)]
pub struct InMemorySessionDirectory {
    records: Arc<RwLock<HashMap<SessionKey, SessionRecord>>>,
}

impl InMemorySessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionDirectory for InMemorySessionDirectory {
    async fn get(&self, event_id: &EventId, passcode: &Passcode) -> Result<Option<SessionRecord>> {
        let key = SessionKey::new(event_id.clone(), passcode.clone());
        let records = self.records.read().await;
        let now = Utc::now();
        Ok(records.get(&key).filter(|r| !r.is_expired(now)).cloned())
    }

    async fn bind(
        &self,
        event_id: &EventId,
        passcode: &Passcode,
        binding: &SessionBinding,
    ) -> Result<()> {
        let key = SessionKey::new(event_id.clone(), passcode.clone());
        let mut records = self.records.write().await;
        let now = Utc::now();
        let record = records
            .get_mut(&key)
            .filter(|r| !r.is_expired(now))
            .ok_or_else(|| DomainError::NotFound(format!("session {}", key)))?;
        record.apply(binding);
        debug!("Bound session {} via {}", key, binding.join_method);
        Ok(())
    }

    async fn put(&self, record: &SessionRecord) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.key(), record.clone());
        Ok(())
    }

    async fn remove(&self, event_id: &EventId, passcode: &Passcode) -> Result<()> {
        let key = SessionKey::new(event_id.clone(), passcode.clone());
        self.records.write().await.remove(&key);
        Ok(())
    }

    async fn find_by_meeting(&self, meeting_id: &MeetingId) -> Result<Vec<SessionRecord>> {
        let records = self.records.read().await;
        let now = Utc::now();
        let mut found: Vec<SessionRecord> = records
            .values()
            .filter(|r| r.meeting_id.as_ref() == Some(meeting_id) && !r.is_expired(now))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.passcode.cmp(&b.passcode));
        Ok(found)
    }
}

//! PostgreSQL implementation of the session directory

use crate::domain::session::{JoinMethod, SessionBinding, SessionDirectory, SessionRecord};
use crate::domain::shared::error::DomainError;
use crate::domain::shared::result::Result;
use crate::domain::shared::value_objects::{
    AttendeeId, EventId, JoinToken, MeetingId, Passcode, PhoneNumber,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error};

#[derive(FromRow)]
struct SessionRow {
    event_id: String,
    meeting_passcode: String,
    phone_number: String,
    name: String,
    join_method: Option<String>,
    meeting_id: Option<String>,
    attendee_id: Option<String>,
    join_token: Option<String>,
    expires_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = DomainError;

    fn try_from(r: SessionRow) -> Result<Self> {
        Ok(SessionRecord {
            event_id: EventId::new(r.event_id),
            passcode: Passcode::parse(&r.meeting_passcode)?,
            phone_number: PhoneNumber::new(r.phone_number),
            name: r.name,
            join_method: r.join_method.as_deref().and_then(JoinMethod::parse),
            meeting_id: r.meeting_id.map(MeetingId::new),
            attendee_id: r.attendee_id.map(AttendeeId::new),
            join_token: r.join_token.map(JoinToken::new),
            expires_at: r.expires_at,
        })
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    error!("{}: {}", context, e);
    DomainError::Collaborator(format!("Database error: {}", e))
}

pub struct PgSessionDirectory {
    pool: PgPool,
}

impl PgSessionDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Remove expired records; returns how many were deleted
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM meeting_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to purge sessions", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionDirectory for PgSessionDirectory {
    async fn get(&self, event_id: &EventId, passcode: &Passcode) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT event_id, meeting_passcode, phone_number, name, join_method,
                   meeting_id, attendee_id, join_token, expires_at
            FROM meeting_sessions
            WHERE event_id = $1 AND meeting_passcode = $2 AND expires_at > NOW()
            "#,
        )
        .bind(event_id.as_str())
        .bind(passcode.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to get session", e))?;

        row.map(SessionRecord::try_from).transpose()
    }

    async fn bind(
        &self,
        event_id: &EventId,
        passcode: &Passcode,
        binding: &SessionBinding,
    ) -> Result<()> {
        debug!("Binding session {}/{} via {}", event_id, passcode, binding.join_method);

        let result = sqlx::query(
            r#"
            UPDATE meeting_sessions
            SET join_method = $3, meeting_id = $4, attendee_id = $5
            WHERE event_id = $1 AND meeting_passcode = $2 AND expires_at > NOW()
            "#,
        )
        .bind(event_id.as_str())
        .bind(passcode.as_str())
        .bind(binding.join_method.as_str())
        .bind(binding.meeting_id.as_str())
        .bind(binding.attendee_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to bind session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound(format!("session {}/{}", event_id, passcode)));
        }
        Ok(())
    }

    async fn put(&self, record: &SessionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO meeting_sessions (
                event_id, meeting_passcode, phone_number, name, join_method,
                meeting_id, attendee_id, join_token, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (event_id, meeting_passcode) DO UPDATE
            SET phone_number = EXCLUDED.phone_number,
                name = EXCLUDED.name,
                join_method = EXCLUDED.join_method,
                meeting_id = EXCLUDED.meeting_id,
                attendee_id = EXCLUDED.attendee_id,
                join_token = EXCLUDED.join_token,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(record.event_id.as_str())
        .bind(record.passcode.as_str())
        .bind(record.phone_number.as_str())
        .bind(&record.name)
        .bind(record.join_method.map(|m| m.as_str()))
        .bind(record.meeting_id.as_ref().map(|m| m.as_str()))
        .bind(record.attendee_id.as_ref().map(|a| a.as_str()))
        .bind(record.join_token.as_ref().map(|t| t.as_str()))
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store session", e))?;

        debug!("Stored session {}", record.key());
        Ok(())
    }

    async fn remove(&self, event_id: &EventId, passcode: &Passcode) -> Result<()> {
        debug!("Removing session {}/{}", event_id, passcode);

        sqlx::query("DELETE FROM meeting_sessions WHERE event_id = $1 AND meeting_passcode = $2")
            .bind(event_id.as_str())
            .bind(passcode.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to remove session", e))?;
        Ok(())
    }

    async fn find_by_meeting(&self, meeting_id: &MeetingId) -> Result<Vec<SessionRecord>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT event_id, meeting_passcode, phone_number, name, join_method,
                   meeting_id, attendee_id, join_token, expires_at
            FROM meeting_sessions
            WHERE meeting_id = $1 AND expires_at > NOW()
            ORDER BY meeting_passcode
            "#,
        )
        .bind(meeting_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to query sessions by meeting", e))?;

        rows.into_iter().map(SessionRecord::try_from).collect()
    }
}

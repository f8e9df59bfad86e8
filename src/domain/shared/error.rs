//! Domain errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A telephony event is missing a field its event kind requires
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The session directory or the meeting service failed the request
    #[error("Collaborator error: {0}")]
    Collaborator(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn malformed(field: &str) -> Self {
        DomainError::MalformedEvent(format!("missing required field '{}'", field))
    }
}

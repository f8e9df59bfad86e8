//! Shared value objects used across multiple bounded contexts

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an opaque string identifier issued by an external system.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Owner-supplied identifier of a meeting event, typed in by callers as digits
    EventId
);
string_id!(
    /// Identifier of a meeting issued by the provisioning service
    MeetingId
);
string_id!(
    /// Identifier of a meeting attendee issued by the provisioning service
    AttendeeId
);
string_id!(
    /// Credential an attendee presents to join a meeting
    JoinToken
);
string_id!(
    /// Participant phone number, also used as the attendee's external user id
    PhoneNumber
);
string_id!(
    /// Telephony platform identifier of one call leg
    CallLegId
);

/// Number of digits a caller keys in for an event id
pub const EVENT_ID_LEN: usize = 6;

impl EventId {
    /// Whether a caller can key this id in at the event id prompt
    pub fn is_dialable(&self) -> bool {
        self.0.len() == EVENT_ID_LEN && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Number of digits in a meeting passcode
pub const PASSCODE_LEN: usize = 6;

/// Six digit meeting passcode
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Passcode(String);

impl Passcode {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() == PASSCODE_LEN && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(DomainError::ValidationError(format!(
                "passcode must be {} digits, got '{}'",
                PASSCODE_LEN, value
            )))
        }
    }

    /// Passcode from a number in 100000..=999999
    pub fn from_number(value: u32) -> Result<Self, DomainError> {
        Self::parse(&value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Passcode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Passcode> for String {
    fn from(value: Passcode) -> Self {
        value.0
    }
}

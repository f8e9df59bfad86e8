//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases that sit
//! next to the call flow: issuing passcodes, web joins and meeting teardown.

pub mod meeting_service;

pub use meeting_service::{IssuedPasscode, MeetingService, NewParticipant, WebJoin};

//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - Value Objects: identifiers issued by the meeting service and callers
//! - Entities: session records keyed by event id and passcode
//! - Domain Services: the call-control state machine
//! - Ports: session directory, meeting provisioning, outbound dialer

pub mod call_control;
pub mod meeting;
pub mod session;
pub mod shared;

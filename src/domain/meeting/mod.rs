//! Meeting bounded context - contracts with the meeting provisioning service

pub mod entity;
pub mod provisioning;
pub mod service;

pub use entity::{Attendee, MeetingCredentials, OutboundCall};
pub use provisioning::{MeetingProvisioning, OutboundDialer};
pub use service::replace_attendee;

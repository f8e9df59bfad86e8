//! Meeting Dialer - phone dial-in for video meetings
//!
//! This is a Domain-Driven Design (DDD) implementation of the call-control
//! service that lets phone participants join a meeting by event id and
//! passcode, or be paged into it by an outbound call.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::DomainError;
pub use domain::shared::result::Result;

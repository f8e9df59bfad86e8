//! Interface layer - External interfaces
//!
//! This layer handles:
//! - Telephony platform invocations
//! - REST API endpoints
//! - Request/response formatting

pub mod api;
pub mod telephony;

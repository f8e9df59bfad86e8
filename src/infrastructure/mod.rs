//! Infrastructure layer - Technical implementations
//!
//! This layer contains:
//! - Session directory implementations (in-memory, PostgreSQL)
//! - Meeting provisioning and outbound dialing adapters

pub mod persistence;
pub mod provisioning;

//! Meeting provisioning and dialing implementations

pub mod memory;

pub use memory::{InMemoryMeetingService, LoggingDialer, RecordingDialer};

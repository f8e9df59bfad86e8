//! Telephony platform invocation interface

pub mod dispatcher;
pub mod envelope;

pub use dispatcher::EventDispatcher;
pub use envelope::{InvocationEvent, InvocationResponse, SCHEMA_VERSION};

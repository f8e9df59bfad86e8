//! Call control bounded context - turns telephony events into platform actions

pub mod action;
pub mod attributes;
pub mod context;
pub mod event;
pub mod machine;
pub mod prompts;

pub use action::{Action, CollectDigits, Speech, TextType, VoiceParams};
pub use attributes::{CallType, TransactionAttributes};
pub use context::InvocationContext;
pub use event::{ActionKind, CallEvent, OutboundArguments};
pub use machine::{CallControl, Transition};

//! Per-invocation context threaded through call handling

use crate::domain::shared::value_objects::CallLegId;
use tracing::{info_span, Span};

/// Identity of one handler invocation: which transaction, which leg.
///
/// Built by the dispatcher for every event and passed down explicitly;
/// log output for the invocation is attached to its span.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    transaction_id: String,
    call_leg: CallLegId,
    span: Span,
}

impl InvocationContext {
    pub fn new(transaction_id: impl Into<String>, event: &str, call_leg: CallLegId) -> Self {
        let transaction_id = transaction_id.into();
        let span = info_span!(
            "invocation",
            transaction_id = %transaction_id,
            event = %event,
            call_id = %call_leg,
        );
        Self {
            transaction_id,
            call_leg,
            span,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Leg the produced actions apply to
    pub fn call_leg(&self) -> &CallLegId {
        &self.call_leg
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

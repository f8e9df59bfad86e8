//! Invocation dispatcher
//!
//! Unwraps one platform envelope, runs the state machine inside the
//! invocation's span and wraps the result in a response envelope.

use super::envelope::{InvocationEvent, InvocationResponse};
use crate::domain::call_control::{CallControl, InvocationContext};
use crate::domain::shared::result::Result;
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info, Instrument};

pub struct EventDispatcher {
    control: Arc<CallControl>,
}

impl EventDispatcher {
    pub fn new(control: Arc<CallControl>) -> Self {
        Self { control }
    }

    pub async fn dispatch(&self, invocation: InvocationEvent) -> Result<InvocationResponse> {
        let event_type = invocation.invocation_event_type.clone();
        counter!("telephony_invocations_total", "event" => event_type.clone()).increment(1);

        let outcome = self.run(&invocation).await;
        if let Err(ref e) = outcome {
            counter!("telephony_invocation_failures_total", "event" => event_type.clone())
                .increment(1);
            error!(
                transaction_id = %invocation.transaction_id(),
                "invocation {} failed: {}", event_type, e
            );
        }
        outcome
    }

    async fn run(&self, invocation: &InvocationEvent) -> Result<InvocationResponse> {
        let call_leg = invocation.call_leg()?.clone();
        let event = invocation.to_call_event()?;
        let ctx = InvocationContext::new(invocation.transaction_id(), event.name(), call_leg);
        let attributes = invocation.attributes();

        let span = ctx.span().clone();
        async move {
            info!("RECV {} attributes={:?}", invocation.invocation_event_type, attributes);
            let transition = self.control.handle(&ctx, event, attributes).await?;
            let response = InvocationResponse::new(transition.actions, transition.attributes);
            info!(
                "RESPONSE actions=[{}]",
                response
                    .actions
                    .iter()
                    .map(|a| a.kind())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(response)
        }
        .instrument(span)
        .await
    }
}

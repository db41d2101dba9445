//! Session orchestration: wires inbound events to tool dispatch and bus
//! emission and exposes the control surface consumed by presentation code.

use crate::bus::{EventBus, SubscriptionHandle};
use crate::error::{Error, Result};
use crate::protocol::OutboundEvent;
use crate::relay::RelayChannel;
use crate::tools::ToolRegistry;
use serde_json::Value;
use std::future::Future;
use std::sync::{PoisonError, RwLock};

/// Event type the provider emits once a function call's arguments are
/// complete and ready to dispatch.
pub const FUNCTION_CALL_ARGUMENTS_DONE: &str = "response.function_call_arguments.done";

const MALFORMED_EVENT_REPLY: &str = "The function call you sent was malformed, try again?";

/// Per-session orchestrator. One inbound event is fully processed (stored,
/// emitted, dispatched) before `receive` returns; the current-event slot is
/// last-write-wins, so concurrent `receive` calls can overwrite each other's
/// slot value. Only the bus emission, keyed to the type captured at receipt,
/// is guaranteed to fire for every received event.
pub struct SessionController {
    bus: EventBus,
    tools: ToolRegistry,
    relay: RelayChannel,
    current: RwLock<Option<Value>>,
}

impl SessionController {
    #[must_use]
    pub fn new(relay: RelayChannel, tools: ToolRegistry) -> Self {
        Self {
            bus: EventBus::new(),
            tools,
            relay,
            current: RwLock::new(None),
        }
    }

    /// Process one raw inbound client event.
    ///
    /// Never faults the hosting process: a malformed payload is logged and
    /// answered with a best-effort corrective message, and tool-dispatch
    /// errors become conversational repair messages instead of propagating
    /// to the transport layer.
    pub async fn receive(&self, raw: &str) {
        let event = match RelayChannel::decode(raw) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(error = %err, "failed to process inbound event");
                self.notify_client(MALFORMED_EVENT_REPLY).await;
                return;
            }
        };

        {
            let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *slot = Some(event.payload.clone());
        }

        self.bus.emit(&event.event_type, &event.payload).await;

        if event.event_type == FUNCTION_CALL_ARGUMENTS_DONE {
            if let Err(err) = self.dispatch_function_call(&event.payload).await {
                self.notify_client(&format!("Error processing function call: {err}"))
                    .await;
            }
        }
    }

    /// Push structured events to the client.
    ///
    /// # Errors
    /// Returns an error if serialization or delivery fails.
    pub async fn send(&self, events: &[OutboundEvent]) -> Result<()> {
        self.relay.send(events).await
    }

    /// Send a user text message and, if `force_response`, a response trigger,
    /// in a single batched push.
    ///
    /// # Errors
    /// Returns an error if serialization or delivery fails.
    pub async fn send_text(&self, text: &str, force_response: bool) -> Result<()> {
        let mut events = vec![OutboundEvent::user_message(text)];
        if force_response {
            events.push(OutboundEvent::ResponseCreate);
        }
        self.relay.send(&events).await
    }

    /// Subscribe to lifecycle events by exact type, `<prefix>.*`, or `*`.
    pub fn on<F, Fut>(&self, pattern: &str, callback: F) -> SubscriptionHandle
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.bus.subscribe(pattern, callback)
    }

    /// Read-only view of the most recently received event, for collaborators
    /// that need synchronous inspection rather than a subscription.
    #[must_use]
    pub fn current_event(&self) -> Option<Value> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn dispatch_function_call(&self, payload: &Value) -> Result<()> {
        let name = payload
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedEvent("function call has no name".to_string()))?;
        let arguments = payload
            .get("arguments")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedEvent("function call has no arguments".to_string()))?;
        // TODO: feed the result back to the model as a function_call_output
        // item instead of dropping it.
        let _ = self.tools.dispatch(name, arguments).await?;
        Ok(())
    }

    async fn notify_client(&self, text: &str) {
        // Best effort; a dead sink must not take the session down with it.
        if let Err(err) = self.send_text(text, true).await {
            tracing::warn!(error = %err, "failed to notify client");
        }
    }
}

//! Transport-facing relay between the session controller and the client.
//!
//! The host supplies the actual delivery mechanism (a Shiny-style custom
//! message, a WebSocket, an in-memory channel in tests) behind [`ClientSink`];
//! the relay only shapes and decodes event envelopes.

use crate::error::{Error, Result};
use crate::protocol::{InboundEvent, OutboundEvent};
use async_trait::async_trait;
use serde_json::Value;

const TRACE_LOG_MAX_BYTES: usize = 1024;
const TRACE_TRUNCATE_SUFFIX: &str = "... (truncated)";

/// Host-supplied outbound transport. Delivery is fire-and-forget from the
/// core's perspective; nothing beyond the call returning is awaited.
#[async_trait]
pub trait ClientSink: Send + Sync {
    async fn deliver(&self, events: Vec<Value>) -> Result<()>;
}

pub struct RelayChannel {
    sink: Box<dyn ClientSink>,
}

impl RelayChannel {
    #[must_use]
    pub fn new(sink: Box<dyn ClientSink>) -> Self {
        Self { sink }
    }

    /// Push a batch of structured events to the connected client in a single
    /// delivery.
    ///
    /// # Errors
    /// Returns an error if serialization or sink delivery fails.
    pub async fn send(&self, events: &[OutboundEvent]) -> Result<()> {
        let mut batch = Vec::with_capacity(events.len());
        for event in events {
            batch.push(serde_json::to_value(event)?);
        }
        tracing::trace!(count = batch.len(), "pushing events to client");
        self.sink.deliver(batch).await
    }

    /// Decode a raw inbound payload. Requires a JSON object with a string
    /// `type` field; everything else stays opaque.
    ///
    /// # Errors
    /// `MalformedEvent` if the payload does not parse or lacks a `type`.
    pub fn decode(raw: &str) -> Result<InboundEvent> {
        tracing::trace!("received event: {}", safe_truncate(raw, TRACE_LOG_MAX_BYTES));
        let payload: Value =
            serde_json::from_str(raw).map_err(|e| Error::MalformedEvent(e.to_string()))?;
        let event_type = payload
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedEvent("event has no type field".to_string()))?
            .to_string();
        Ok(InboundEvent {
            event_type,
            payload,
        })
    }
}

fn safe_truncate(s: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if s.len() <= max_bytes {
        return std::borrow::Cow::Borrowed(s);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    std::borrow::Cow::Owned(format!(
        "{} {} {} bytes",
        &s[..end],
        TRACE_TRUNCATE_SUFFIX,
        s.len() - end
    ))
}

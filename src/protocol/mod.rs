//! Wire-level types shared between the relay core and the upstream provider.
//!
//! Only the envelopes this crate actually produces or inspects are modeled;
//! everything else in the provider's event vocabulary travels through the
//! relay as opaque JSON.

pub mod events;
pub mod session;

pub use events::{ContentPart, InboundEvent, Item, OutboundEvent, Role};
pub use session::{SessionConfig, ToolSchema, TurnDetection, Voice, DEFAULT_MODEL};

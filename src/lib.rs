#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]

//! Event relay and tool-dispatch core for browser-hosted realtime voice
//! sessions.
//!
//! The crate sits between a browser client and an upstream realtime voice
//! API: [`CredentialBroker`] mints short-lived client tokens,
//! [`RelayChannel`] moves event envelopes in both directions,
//! [`ToolRegistry`] dispatches model-invoked function calls to server-side
//! handlers, and [`SessionController`] ties them together and republishes
//! every inbound event on an [`EventBus`] that application code subscribes
//! to by exact type, hierarchical wildcard (`response.*`), or `*`.
//!
//! Event payloads stay opaque JSON except for the `type` discriminator and,
//! for function calls, `name`/`arguments`. Rendering, history persistence,
//! and end-user auth are the host's concern.

pub mod broker;
pub mod bus;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod session;
pub mod tools;

pub use broker::{CredentialBroker, MintedCredential};
pub use bus::{EventBus, SubscriptionHandle};
pub use error::{Error, Result};
pub use protocol::{
    ContentPart, InboundEvent, Item, OutboundEvent, Role, SessionConfig, ToolSchema,
    TurnDetection, Voice, DEFAULT_MODEL,
};
pub use relay::{ClientSink, RelayChannel};
pub use session::{SessionController, FUNCTION_CALL_ARGUMENTS_DONE};
pub use tools::ToolRegistry;

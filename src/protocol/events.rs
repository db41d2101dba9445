use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events the relay pushes to the connected client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum OutboundEvent {
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: Item },
    #[serde(rename = "response.create")]
    ResponseCreate,
}

impl OutboundEvent {
    /// Wrap `text` into a user-message creation envelope.
    #[must_use]
    pub fn user_message(text: impl Into<String>) -> Self {
        Self::ConversationItemCreate {
            item: Item::Message {
                role: Role::User,
                content: vec![ContentPart::InputText { text: text.into() }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Item {
    #[serde(rename = "message")]
    Message { role: Role, content: Vec<ContentPart> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "input_text")]
    InputText { text: String },
}

/// A decoded inbound client event: the `type` discriminator plus the full
/// payload, which the core otherwise treats as opaque.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub event_type: String,
    pub payload: Value,
}

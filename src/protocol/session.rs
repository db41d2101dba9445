use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_MODEL: &str = "gpt-realtime";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Ash,
    Ballad,
    Cedar,
    Coral,
    Echo,
    Fable,
    #[default]
    Marin,
    Nova,
    Onyx,
    Sage,
    Shimmer,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnDetection {
    #[default]
    SemanticVad,
    ServerVad,
}

/// A tool exposed to the upstream model, with a declarative JSON-schema
/// parameter description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ToolSchema {
    #[serde(rename = "function")]
    Function {
        name: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        parameters: Value,
    },
}

/// Configuration for one credential-minting exchange. Immutable per mint;
/// `extra` carries provider-specific options merged into the request body
/// alongside the session object.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model: String,
    pub voice: Voice,
    pub speed: f64,
    pub instructions: String,
    pub turn_detection: TurnDetection,
    pub tools: Vec<ToolSchema>,
    pub extra: Map<String, Value>,
}

impl SessionConfig {
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            voice: Voice::default(),
            speed: 1.0,
            instructions: String::new(),
            turn_detection: TurnDetection::default(),
            tools: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

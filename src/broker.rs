//! Ephemeral credential minting against the upstream realtime API.
//!
//! The broker exchanges the long-lived server-side API key for a short-lived
//! client session token. It never retries; retry policy belongs to the
//! caller.

use crate::error::{Error, Result};
use crate::protocol::SessionConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/realtime/client_secrets";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// A minted session token plus the model it was minted for, serialized in
/// the shape the client transport layer expects (`key` on the wire).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MintedCredential {
    #[serde(rename = "key")]
    pub token: String,
    pub model: String,
}

#[derive(Clone, Debug)]
pub struct CredentialBroker {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl CredentialBroker {
    /// Create a broker against the default upstream endpoint. `api_key` may
    /// be absent; minting then fails with `MissingCredential` without any
    /// network traffic.
    ///
    /// # Errors
    /// `Http` if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(DEFAULT_ENDPOINT)?;
        Self::with_endpoint(api_key, endpoint)
    }

    /// Create a broker against a custom credential endpoint.
    ///
    /// # Errors
    /// `Http` if the HTTP client cannot be built.
    pub fn with_endpoint(api_key: Option<String>, endpoint: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .pool_idle_timeout(DEFAULT_POOL_IDLE_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    /// Exchange the server-side API key for a short-lived client token.
    ///
    /// Issues exactly one POST with the session configuration embedded;
    /// the token is read from the `value` field of a 2xx response.
    ///
    /// # Errors
    /// `MissingCredential` if no API key is configured (checked before any
    /// network call), `Upstream` for transport failures, non-2xx statuses,
    /// and responses missing the token field.
    pub async fn mint(&self, config: &SessionConfig) -> Result<MintedCredential> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(Error::MissingCredential);
        };

        let body = request_body(config);
        tracing::trace!(model = %config.model, "minting client credential");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream {
                status: None,
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                status: Some(status.as_u16()),
                detail,
            });
        }

        let data: Value = response.json().await.map_err(|e| Error::Upstream {
            status: Some(status.as_u16()),
            detail: e.to_string(),
        })?;
        let token = data
            .get("value")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Upstream {
                status: Some(status.as_u16()),
                detail: "response missing token value".to_string(),
            })?;

        Ok(MintedCredential {
            token: token.to_string(),
            model: config.model.clone(),
        })
    }
}

fn request_body(config: &SessionConfig) -> Value {
    let mut body = Map::new();
    body.insert(
        "session".to_string(),
        json!({
            "type": "realtime",
            "model": &config.model,
            "instructions": &config.instructions,
            "audio": {
                "input": { "turn_detection": config.turn_detection },
                "output": { "voice": config.voice, "speed": config.speed },
            },
            "tools": &config.tools,
        }),
    );
    // Provider-specific options ride alongside the session object.
    for (key, value) in &config.extra {
        body.insert(key.clone(), value.clone());
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ToolSchema, Voice};

    #[test]
    fn request_body_embeds_session_shape() {
        let mut config = SessionConfig::new("gpt-realtime");
        config.voice = Voice::Cedar;
        config.speed = 1.2;
        config.instructions = "Be brief.".to_string();
        config.tools = vec![ToolSchema::Function {
            name: "set_mode".to_string(),
            description: None,
            parameters: json!({"type": "object"}),
        }];
        config
            .extra
            .insert("tracing".to_string(), json!({"workflow_name": "demo"}));

        let body = request_body(&config);

        assert_eq!(body["session"]["type"], "realtime");
        assert_eq!(body["session"]["model"], "gpt-realtime");
        assert_eq!(body["session"]["instructions"], "Be brief.");
        assert_eq!(
            body["session"]["audio"]["input"]["turn_detection"]["type"],
            "semantic_vad"
        );
        assert_eq!(body["session"]["audio"]["output"]["voice"], "cedar");
        assert_eq!(body["session"]["audio"]["output"]["speed"], 1.2);
        assert_eq!(body["session"]["tools"][0]["name"], "set_mode");
        assert_eq!(body["tracing"]["workflow_name"], "demo");
    }

    #[test]
    fn endpoint_parse_failures_stay_out_of_the_upstream_variant() {
        let err: Error = Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn minted_credential_serializes_for_the_client() {
        let minted = MintedCredential {
            token: "ek_abc".to_string(),
            model: "gpt-realtime".to_string(),
        };
        let json = serde_json::to_value(&minted).unwrap();
        assert_eq!(json, json!({"key": "ek_abc", "model": "gpt-realtime"}));
    }
}

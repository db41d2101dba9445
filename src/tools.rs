//! Named tool handlers the remote model can invoke with JSON arguments.

use crate::error::{Error, Result};
use crate::protocol::ToolSchema;
use futures::future::BoxFuture;
use schemars::schema::RootSchema;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

type Handler = Box<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

struct ToolEntry {
    description: Option<String>,
    schema: RootSchema,
    handler: Handler,
}

/// Registry mapping tool names to async handlers with declarative parameter
/// schemas. Registering a name twice silently shadows the earlier handler;
/// that mirrors how the hosting app builds its tool list and is documented
/// behavior, not a defect.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolEntry>,
    order: Vec<String>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered tool names, in first-registration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Register a typed async tool. The parameter schema is derived from
    /// `TArgs` at compile time.
    pub fn tool<TArgs, TResp, F, Fut, E>(&mut self, name: &str, handler: F)
    where
        TArgs: DeserializeOwned + JsonSchema + Send + 'static,
        TResp: Serialize + Send + 'static,
        F: Fn(TArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<TResp, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.register(name, None, handler);
    }

    /// Register a typed async tool with a description surfaced to the model.
    pub fn tool_with_description<TArgs, TResp, F, Fut, E>(
        &mut self,
        name: &str,
        description: impl Into<String>,
        handler: F,
    ) where
        TArgs: DeserializeOwned + JsonSchema + Send + 'static,
        TResp: Serialize + Send + 'static,
        F: Fn(TArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<TResp, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.register(name, Some(description.into()), handler);
    }

    fn register<TArgs, TResp, F, Fut, E>(
        &mut self,
        name: &str,
        description: Option<String>,
        handler: F,
    ) where
        TArgs: DeserializeOwned + JsonSchema + Send + 'static,
        TResp: Serialize + Send + 'static,
        F: Fn(TArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<TResp, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let schema = schemars::schema_for!(TArgs);
        let user_handler = Arc::new(handler);
        let handler = move |value: Value| -> BoxFuture<'static, Result<Value>> {
            let user_handler = Arc::clone(&user_handler);
            Box::pin(async move {
                let args: TArgs = serde_json::from_value(value)
                    .map_err(|e| Error::MalformedArguments(e.to_string()))?;
                let resp = user_handler(args)
                    .await
                    .map_err(|e| Error::ToolExecution(e.to_string()))?;
                serde_json::to_value(resp).map_err(Error::Serialization)
            })
        };

        let entry = ToolEntry {
            description,
            schema,
            handler: Box::new(handler),
        };
        if self.tools.insert(name.to_string(), entry).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Dispatch a function call by name with a JSON-encoded argument string.
    ///
    /// The returned value is currently discarded by the session controller;
    /// it is produced anyway so hosts driving the registry directly can use
    /// it.
    ///
    /// # Errors
    /// `MalformedArguments` if `arguments_json` does not parse or does not
    /// match the tool's parameter schema, `UnknownTool` on a name miss, and
    /// `ToolExecution` if the handler itself fails.
    pub async fn dispatch(&self, name: &str, arguments_json: &str) -> Result<Value> {
        let arguments: Value = serde_json::from_str(arguments_json)
            .map_err(|e| Error::MalformedArguments(e.to_string()))?;
        let entry = self
            .tools
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;
        (entry.handler)(arguments).await
    }

    /// Export every registered tool as a callable-signature schema for the
    /// credential broker.
    ///
    /// # Errors
    /// Returns an error if schema serialization fails.
    pub fn schemas(&self) -> Result<Vec<ToolSchema>> {
        let mut out = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let Some(entry) = self.tools.get(name) else {
                continue;
            };
            out.push(ToolSchema::Function {
                name: name.clone(),
                description: entry.description.clone(),
                parameters: serde_json::to_value(&entry.schema)?,
            });
        }
        Ok(out)
    }
}

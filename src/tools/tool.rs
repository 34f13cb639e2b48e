//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::arguments::ToolArguments;
use super::types::{ToolParameters, ToolPayload};
use crate::error::BridgeError;
use crate::provider::ToolDefinition;

/// A capability the assistant can call mid-run.
///
/// `Err` is reserved for failures the tool could not express as a payload
/// (bad arguments, bugs); the invoker turns those into error payloads too.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the run calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &ToolParameters;

    /// Execute the tool with decoded arguments.
    async fn execute(&self, args: &ToolArguments) -> Result<ToolPayload, BridgeError>;

    /// Definition registered with the assistant.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().schema.clone(),
        }
    }
}

type ToolFuture = Pin<Box<dyn Future<Output = Result<ToolPayload, BridgeError>> + Send>>;

type ToolHandler = dyn Fn(ToolArguments) -> ToolFuture + Send + Sync;

/// Closure-based tool for quick tool creation.
pub struct FnTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: Arc<ToolHandler>,
}

impl FnTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolPayload, BridgeError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<ToolPayload, BridgeError> {
        (self.handler)(args.clone()).await
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

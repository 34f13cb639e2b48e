//! Dispatch of run tool calls to registered tools.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::tool::Tool;
use super::types::ToolPayload;
use crate::provider::ToolDefinition;
use crate::types::{ToolCallRequest, ToolOutput};

/// Executes tool calls and always answers each one.
///
/// Every call yields exactly one [`ToolOutput`] keyed by its call id: unknown
/// tools, undecodable arguments, and tool errors all become `{"error": ...}`
/// payloads instead of failing the batch.
#[derive(Clone, Default)]
pub struct ToolInvoker {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("ToolInvoker").field("tools", &names).finish()
    }
}

impl ToolInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions to register with the assistant.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Run one call.
    pub async fn invoke(&self, call: &ToolCallRequest) -> ToolOutput {
        let Some(tool) = self.tools.iter().find(|t| t.name() == call.name) else {
            warn!(tool = %call.name, call_id = %call.id, "run requested unknown tool");
            return ToolPayload::failure(format!("Unknown tool: {}", call.name))
                .into_output(&call.id);
        };

        let payload = match ToolArguments::parse(&call.arguments) {
            Ok(args) => match tool.execute(&args).await {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(
                        tool = %call.name,
                        call_id = %call.id,
                        error = %err,
                        "tool execution failed"
                    );
                    ToolPayload::failure(err.to_string())
                }
            },
            Err(err) => {
                warn!(
                    tool = %call.name,
                    call_id = %call.id,
                    error = %err,
                    "undecodable tool arguments"
                );
                ToolPayload::failure(err.to_string())
            }
        };

        debug!(
            tool = %call.name,
            call_id = %call.id,
            is_error = payload.is_error(),
            "tool call answered"
        );
        payload.into_output(&call.id)
    }

    /// Run a batch of calls concurrently; outputs keep the request order.
    pub async fn invoke_all(&self, calls: &[ToolCallRequest]) -> Vec<ToolOutput> {
        join_all(calls.iter().map(|call| self.invoke(call))).await
    }
}

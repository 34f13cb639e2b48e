//! Assistant-run API client trait and implementations.

pub mod http;
pub mod openai;

use async_trait::async_trait;
use bon::Builder;

use crate::error::Result;
use crate::types::{RunEventStream, ToolOutput};

pub use openai::OpenAiAssistants;

/// Tool definition sent to the assistant API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Parameters for creating the assistant identity used by a session.
#[derive(Debug, Clone, Builder)]
pub struct AssistantSpec {
    #[builder(into)]
    pub model: String,
    #[builder(into)]
    pub name: Option<String>,
    #[builder(into)]
    pub instructions: String,
    #[builder(default)]
    pub tools: Vec<ToolDefinition>,
}

/// Hosted assistant-run API: threads, streamed runs, and run control.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    /// Create an assistant and return its id.
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<String>;

    /// Create an empty thread and return its id.
    async fn create_thread(&self) -> Result<String>;

    /// Append a user message to a thread.
    async fn add_message(&self, thread_id: &str, text: &str) -> Result<()>;

    /// Start a streamed run of `assistant_id` on `thread_id`.
    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunEventStream>;

    /// Resume a run waiting on tool outputs; returns the continuation stream.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunEventStream>;

    /// Ask the API to cancel a run.
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<()>;
}

//! Run stream event envelope.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Event names emitted by an assistant run stream.
pub mod event_names {
    pub const RUN_CREATED: &str = "thread.run.created";
    pub const RUN_REQUIRES_ACTION: &str = "thread.run.requires_action";
    pub const RUN_COMPLETED: &str = "thread.run.completed";
    pub const RUN_FAILED: &str = "thread.run.failed";
    pub const RUN_STEP_CREATED: &str = "thread.run.step.created";
    pub const MESSAGE_DELTA: &str = "thread.message.delta";
    pub const MESSAGE_COMPLETED: &str = "thread.message.completed";
    pub const ERROR: &str = "error";
    pub const DONE: &str = "done";
}

/// One event from a run stream: an `event` tag plus a tag-dependent `data`
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStreamEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl RunStreamEvent {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// `thread.run.created` for the given run id.
    pub fn run_created(run_id: &str) -> Self {
        Self::new(
            event_names::RUN_CREATED,
            serde_json::json!({ "id": run_id, "object": "thread.run", "status": "queued" }),
        )
    }

    /// `thread.message.delta` carrying one text fragment.
    pub fn text_delta(text: &str) -> Self {
        Self::new(
            event_names::MESSAGE_DELTA,
            serde_json::json!({
                "object": "thread.message.delta",
                "delta": {
                    "content": [
                        { "index": 0, "type": "text", "text": { "value": text } }
                    ]
                }
            }),
        )
    }

    /// `thread.message.completed` with the final message text.
    pub fn message_completed(text: &str) -> Self {
        Self::new(
            event_names::MESSAGE_COMPLETED,
            serde_json::json!({
                "object": "thread.message",
                "status": "completed",
                "content": [
                    { "type": "text", "text": { "value": text, "annotations": [] } }
                ]
            }),
        )
    }

    /// `thread.run.step.created` of the given step kind.
    pub fn step_created(kind: &str) -> Self {
        Self::new(
            event_names::RUN_STEP_CREATED,
            serde_json::json!({
                "object": "thread.run.step",
                "type": kind,
                "step_details": { "type": kind }
            }),
        )
    }

    /// `thread.run.requires_action` asking for the given function calls.
    pub fn requires_action(run_id: &str, calls: &[crate::types::ToolCallRequest]) -> Self {
        let tool_calls: Vec<serde_json::Value> = calls
            .iter()
            .map(|call| {
                serde_json::json!({
                    "id": call.id,
                    "type": "function",
                    "function": { "name": call.name, "arguments": call.arguments }
                })
            })
            .collect();
        Self::new(
            event_names::RUN_REQUIRES_ACTION,
            serde_json::json!({
                "id": run_id,
                "object": "thread.run",
                "status": "requires_action",
                "required_action": {
                    "type": "submit_tool_outputs",
                    "submit_tool_outputs": { "tool_calls": tool_calls }
                }
            }),
        )
    }

    pub fn run_completed(run_id: &str) -> Self {
        Self::new(
            event_names::RUN_COMPLETED,
            serde_json::json!({ "id": run_id, "object": "thread.run", "status": "completed" }),
        )
    }

    pub fn run_failed(run_id: &str, message: &str) -> Self {
        Self::new(
            event_names::RUN_FAILED,
            serde_json::json!({
                "id": run_id,
                "object": "thread.run",
                "status": "failed",
                "last_error": { "code": "server_error", "message": message }
            }),
        )
    }
}

/// Stream of run events handed from a provider to a coordinator.
pub type RunEventStream = BoxStream<'static, Result<RunStreamEvent, BridgeError>>;

//! Tool call requests and outputs.

use serde::{Deserialize, Serialize};

/// One function call requested by a run.
///
/// `arguments` is the JSON-encoded argument object exactly as the run sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.to_string(),
        }
    }
}

/// Answer to one [`ToolCallRequest`], keyed by its call id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

impl ToolOutput {
    pub fn new(tool_call_id: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output: output.into(),
        }
    }

    /// Parse the output back into JSON. Outputs are always JSON documents.
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.output).ok()
    }
}

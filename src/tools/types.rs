//! Tool parameter schemas and payloads.

use serde::{Deserialize, Serialize};

use crate::types::ToolOutput;

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: serde_json::Value,
}

impl ToolParameters {
    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    /// Add a string property.
    pub fn string(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        let name = name.into();
        self.properties.insert(
            name.clone(),
            serde_json::json!({
                "type": "string",
                "description": description.into(),
            }),
        );
        if required {
            self.required.push(name);
        }
        self
    }

    /// Build into ToolParameters.
    pub fn build(self) -> ToolParameters {
        ToolParameters {
            schema: serde_json::json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}

/// Result of running a tool: either the tool's JSON result or an error
/// payload. Errors are data here; they are sent back to the run like any
/// other output.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPayload {
    Success(serde_json::Value),
    Failure {
        error: String,
        details: Option<serde_json::Value>,
    },
}

impl ToolPayload {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
            details: None,
        }
    }

    pub fn failure_with_details(error: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Failure {
            error: error.into(),
            details: Some(details),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Success(value) => value.clone(),
            Self::Failure { error, details } => {
                let mut payload = serde_json::json!({ "error": error });
                if let Some(details) = details {
                    payload["details"] = details.clone();
                }
                payload
            }
        }
    }

    /// Serialize into the output for `tool_call_id`.
    pub fn into_output(self, tool_call_id: impl Into<String>) -> ToolOutput {
        ToolOutput::new(tool_call_id, self.to_json().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_builder_constructs_schema() {
        let params = ToolParameters::object()
            .string("query", "Search query", true)
            .string("topic", "Optional topic", false)
            .build();

        let schema = &params.schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["properties"]["topic"]["type"], "string");
        assert_eq!(schema["required"], serde_json::json!(["query"]));
    }

    #[test]
    fn failure_payload_includes_details_only_when_present() {
        let bare = ToolPayload::failure("nope").to_json();
        assert_eq!(bare, serde_json::json!({ "error": "nope" }));

        let detailed = ToolPayload::failure_with_details(
            "Search failed with status: 500",
            serde_json::json!("boom"),
        )
        .to_json();
        assert_eq!(detailed["details"], "boom");
    }

    #[test]
    fn into_output_serializes_json_string() {
        let output =
            ToolPayload::Success(serde_json::json!({ "answer": 42 })).into_output("call_1");
        assert_eq!(output.tool_call_id, "call_1");
        assert_eq!(output.json(), Some(serde_json::json!({ "answer": 42 })));
    }
}

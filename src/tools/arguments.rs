//! Typed access to tool call arguments.

use crate::error::BridgeError;

/// Decoded arguments of one tool call.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Decode the JSON-encoded argument string sent by a run.
    ///
    /// An empty string decodes to an empty object.
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(serde_json::json!({})));
        }
        let value = serde_json::from_str::<serde_json::Value>(trimmed).map_err(|e| {
            BridgeError::InvalidArgument(format!("Failed to decode arguments: {e}"))
        })?;
        if !value.is_object() {
            return Err(BridgeError::InvalidArgument(
                "Tool arguments must be a JSON object".to_string(),
            ));
        }
        Ok(Self::new(value))
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, BridgeError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| BridgeError::InvalidArgument(format!("Missing string argument: {key}")))
    }
}

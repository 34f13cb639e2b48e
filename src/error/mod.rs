//! Error types for the bridge.

use thiserror::Error;

/// Primary error type for all bridge operations.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Run failed: {0}")]
    RunFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl BridgeError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Human-facing message without the variant prefix.
    ///
    /// Used when the error text is written back into a chat message.
    pub fn user_message(&self) -> String {
        match self {
            Self::RunFailed(message) | Self::Stream(message) | Self::Chat(message) => {
                message.clone()
            }
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, BridgeError>;

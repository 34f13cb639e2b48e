//! Chat platform boundary: reply messages, channel events, stop signals.

pub mod console;
pub mod stop;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Result;

pub use console::ConsoleChat;
pub use stop::{StopGenerating, StopSignals, StopSubscription};

/// Fallback text written to a reply when an error carries no message.
pub const GENERIC_ERROR_TEXT: &str = "Error generating the message";

/// The chat-side message a coordinator fills in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub id: String,
    /// Channel id (`cid`) the message lives in.
    pub channel_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A message posted by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: String,
    pub channel_id: String,
    pub text: String,
    #[serde(default)]
    pub ai_generated: bool,
}

/// What the assistant is currently doing, as shown to chat users.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
pub enum AiState {
    #[serde(rename = "AI_STATE_THINKING")]
    #[strum(serialize = "AI_STATE_THINKING")]
    Thinking,
    #[serde(rename = "AI_STATE_CHECKING_SOURCES")]
    #[strum(serialize = "AI_STATE_CHECKING_SOURCES")]
    CheckingSources,
    #[serde(rename = "AI_STATE_EXTERNAL_SOURCES")]
    #[strum(serialize = "AI_STATE_EXTERNAL_SOURCES")]
    ExternalSources,
    #[serde(rename = "AI_STATE_ERROR")]
    #[strum(serialize = "AI_STATE_ERROR")]
    Error,
}

/// Ephemeral status signal sent to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelEvent {
    #[serde(rename = "ai_indicator.update")]
    IndicatorUpdate { ai_state: AiState },
    #[serde(rename = "ai_indicator.clear")]
    IndicatorClear,
}

impl ChannelEvent {
    pub fn state(state: AiState) -> Self {
        Self::IndicatorUpdate { ai_state: state }
    }

    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IndicatorUpdate { .. } => "ai_indicator.update",
            Self::IndicatorClear => "ai_indicator.clear",
        }
    }
}

/// Fields overwritten by a partial message update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageUpdate {
    pub text: String,
    /// Secondary diagnostic field, only set on error replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MessageUpdate {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            message: None,
        }
    }

    pub fn error(text: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            message: Some(diagnostic.into()),
        }
    }
}

/// Chat platform operations the bridge needs.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Post a new message to a channel.
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        ai_generated: bool,
    ) -> Result<ReplyMessage>;

    /// Send an ephemeral status signal tied to a message.
    async fn send_event(
        &self,
        channel_id: &str,
        message_id: &str,
        event: ChannelEvent,
    ) -> Result<()>;

    /// Overwrite fields of an existing message.
    async fn partial_update_message(&self, message_id: &str, update: MessageUpdate) -> Result<()>;
}

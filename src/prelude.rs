//! Convenience re-exports for common use.

pub use crate::agent::{AgentRegistry, AssistantSession, InboundEvent, ReplyHandle};
pub use crate::chat::{
    AiState, ChannelEvent, ChatClient, ConsoleChat, IncomingMessage, MessageUpdate, ReplyMessage,
    StopGenerating, StopSignals,
};
pub use crate::config::BridgeConfig;
pub use crate::coordinator::ResponseCoordinator;
pub use crate::error::{BridgeError, Result};
pub use crate::provider::{AssistantClient, OpenAiAssistants};
pub use crate::tools::{Tool, ToolInvoker, ToolPayload, WebSearchTool};
pub use crate::types::{RunEventStream, RunStreamEvent, ToolCallRequest, ToolOutput};

//! assistant-bridge: relay chat messages into assistant runs.
//!
//! A user message in a chat channel is appended to an assistant thread and a
//! streamed run is started. A [`coordinator::ResponseCoordinator`] consumes
//! the run's events, mirrors the growing answer into an `ai_generated` reply
//! message, answers `web_search` tool calls, and tears down on completion,
//! failure, or a stop-generating signal.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use assistant_bridge::prelude::*;
//!
//! # async fn example() -> assistant_bridge::error::Result<()> {
//! let config = BridgeConfig::from_env();
//! let client = Arc::new(OpenAiAssistants::from_config(&config)?);
//! let chat = Arc::new(ConsoleChat::new());
//! let tools = ToolInvoker::new().with_tool(Arc::new(WebSearchTool::new(config.clone())));
//!
//! let session = AssistantSession::start(client, chat, tools, config, "cli:local").await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub mod logging;

//! Terminal-backed chat client used by the CLI.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{ChannelEvent, ChatClient, MessageUpdate, ReplyMessage};
use crate::error::{BridgeError, Result};

/// Prints reply text as it grows.
///
/// Each update only writes the part of the text that was not printed yet; an
/// update that rewrites earlier text (an error notice) starts a new line.
pub struct ConsoleChat {
    out: Mutex<Box<dyn Write + Send>>,
    printed: Mutex<HashMap<String, String>>,
}

impl Default for ConsoleChat {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleChat {
    pub fn new() -> Self {
        Self::with_writer(std::io::stdout())
    }

    pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(writer)),
            printed: Mutex::new(HashMap::new()),
        }
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| BridgeError::Chat("console writer poisoned".to_string()))?;
        out.write_all(text.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| BridgeError::Chat(e.to_string()))
    }
}

#[async_trait]
impl ChatClient for ConsoleChat {
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        ai_generated: bool,
    ) -> Result<ReplyMessage> {
        let message = ReplyMessage {
            id: Uuid::new_v4().to_string(),
            channel_id: channel_id.to_string(),
            text: text.to_string(),
            ai_generated,
            created_at: Some(Utc::now()),
        };
        if let Ok(mut printed) = self.printed.lock() {
            printed.insert(message.id.clone(), String::new());
        }
        if !text.is_empty() {
            self.partial_update_message(&message.id, MessageUpdate::text(text))
                .await?;
        }
        Ok(message)
    }

    async fn send_event(
        &self,
        channel_id: &str,
        message_id: &str,
        event: ChannelEvent,
    ) -> Result<()> {
        match &event {
            ChannelEvent::IndicatorUpdate { ai_state } => {
                tracing::info!(channel_id, message_id, state = %ai_state, "{}", event.kind());
            }
            ChannelEvent::IndicatorClear => {
                tracing::info!(channel_id, message_id, "{}", event.kind());
            }
        }
        Ok(())
    }

    async fn partial_update_message(&self, message_id: &str, update: MessageUpdate) -> Result<()> {
        let pending = {
            let mut printed = self
                .printed
                .lock()
                .map_err(|_| BridgeError::Chat("console state poisoned".to_string()))?;
            let shown = printed.entry(message_id.to_string()).or_default();
            let pending = match update.text.strip_prefix(shown.as_str()) {
                Some(suffix) => suffix.to_string(),
                None => format!("\n{}", update.text),
            };
            *shown = update.text.clone();
            pending
        };

        if let Some(diagnostic) = &update.message {
            tracing::debug!(message_id, diagnostic = %diagnostic, "reply replaced with error");
        }
        if pending.is_empty() {
            return Ok(());
        }
        self.write(&pending)
    }
}

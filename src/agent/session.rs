//! Assistant session for one chat channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::chat::{
    AiState, ChannelEvent, ChatClient, IncomingMessage, ReplyMessage, StopGenerating, StopSignals,
};
use crate::config::BridgeConfig;
use crate::coordinator::ResponseCoordinator;
use crate::error::{BridgeError, Result};
use crate::provider::{AssistantClient, AssistantSpec};
use crate::tools::ToolInvoker;

/// Events a session reacts to, as delivered by the chat platform.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    NewMessage(IncomingMessage),
    StopGenerating(StopGenerating),
}

/// A reply being generated in the background.
#[derive(Debug)]
pub struct ReplyHandle {
    pub reply: ReplyMessage,
    task: JoinHandle<()>,
}

impl ReplyHandle {
    /// Wait until the reply's coordinator has disposed.
    pub async fn finished(self) {
        if let Err(err) = self.task.await {
            if !err.is_cancelled() {
                warn!(message_id = %self.reply.id, error = %err, "reply task panicked");
            }
        }
    }
}

/// Owns the assistant identity and thread for one channel and starts one
/// coordinator per AI reply.
pub struct AssistantSession {
    client: Arc<dyn AssistantClient>,
    chat: Arc<dyn ChatClient>,
    stop_signals: StopSignals,
    tools: ToolInvoker,
    config: BridgeConfig,
    channel_id: String,
    assistant_id: String,
    thread_id: String,
    active: Arc<Mutex<HashMap<String, AbortHandle>>>,
}

impl std::fmt::Debug for AssistantSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantSession")
            .field("channel_id", &self.channel_id)
            .field("assistant_id", &self.assistant_id)
            .field("thread_id", &self.thread_id)
            .field("active", &self.active_replies())
            .finish()
    }
}

impl AssistantSession {
    /// Create the assistant (with the invoker's tools) and a fresh thread.
    pub async fn start(
        client: Arc<dyn AssistantClient>,
        chat: Arc<dyn ChatClient>,
        tools: ToolInvoker,
        config: BridgeConfig,
        channel_id: impl Into<String>,
    ) -> Result<Self> {
        let channel_id = channel_id.into();
        let spec = AssistantSpec::builder()
            .model(config.assistant_model())
            .name(format!("assistant-bridge:{channel_id}"))
            .instructions(config.instructions())
            .tools(tools.definitions())
            .build();
        let assistant_id = client.create_assistant(&spec).await?;
        let thread_id = client.create_thread().await?;
        info!(
            channel_id = %channel_id,
            assistant_id = %assistant_id,
            thread_id = %thread_id,
            "session started"
        );

        Ok(Self::resume(
            client,
            chat,
            tools,
            config,
            channel_id,
            assistant_id,
            thread_id,
        ))
    }

    /// Continue an existing assistant and thread.
    pub fn resume(
        client: Arc<dyn AssistantClient>,
        chat: Arc<dyn ChatClient>,
        tools: ToolInvoker,
        config: BridgeConfig,
        channel_id: impl Into<String>,
        assistant_id: impl Into<String>,
        thread_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            chat,
            stop_signals: StopSignals::new(),
            tools,
            config,
            channel_id: channel_id.into(),
            assistant_id: assistant_id.into(),
            thread_id: thread_id.into(),
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn stop_signals(&self) -> &StopSignals {
        &self.stop_signals
    }

    /// Reply message ids whose coordinators have not disposed yet.
    pub fn active_replies(&self) -> Vec<String> {
        self.active
            .lock()
            .map(|active| active.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Relay a user message into the thread and start streaming the reply.
    ///
    /// AI-generated, empty, and other-channel messages are ignored.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Result<Option<ReplyHandle>> {
        if message.ai_generated || message.text.trim().is_empty() {
            debug!(message_id = %message.id, "skipping message");
            return Ok(None);
        }
        if message.channel_id != self.channel_id {
            debug!(
                message_id = %message.id,
                channel_id = %message.channel_id,
                "message for another channel"
            );
            return Ok(None);
        }

        self.client
            .add_message(&self.thread_id, &message.text)
            .await?;
        let stream = self
            .client
            .stream_run(&self.thread_id, &self.assistant_id)
            .await?;

        let reply = self
            .chat
            .send_message(&self.channel_id, "", true)
            .await?;
        self.chat
            .send_event(&self.channel_id, &reply.id, ChannelEvent::state(AiState::Thinking))
            .await?;

        let active = Arc::clone(&self.active);
        let mut coordinator = ResponseCoordinator::builder()
            .client(Arc::clone(&self.client))
            .chat(Arc::clone(&self.chat))
            .stop_signals(self.stop_signals.clone())
            .thread_id(self.thread_id.clone())
            .stream(stream)
            .message(reply.clone())
            .tools(self.tools.clone())
            .throttle(self.config.throttle())
            .on_dispose(Box::new(move |message_id: &str| {
                if let Ok(mut active) = active.lock() {
                    active.remove(message_id);
                }
            }))
            .build();

        // Holding the lock while spawning keeps a fast-finishing task from
        // removing its entry before it is inserted.
        let task = {
            let mut active = self
                .active
                .lock()
                .map_err(|_| BridgeError::InvalidState("active replies poisoned".into()))?;
            let task = tokio::spawn(async move {
                coordinator.run().await;
            });
            active.insert(reply.id.clone(), task.abort_handle());
            task
        };

        info!(message_id = %reply.id, thread_id = %self.thread_id, "reply started");
        Ok(Some(ReplyHandle { reply, task }))
    }

    /// Forward a stop-generating signal to the matching coordinator.
    pub fn stop_generating(&self, signal: StopGenerating) -> bool {
        self.stop_signals.dispatch(signal)
    }

    /// Consume inbound events until the sender closes, then shut down.
    pub async fn serve(&self, mut events: mpsc::Receiver<InboundEvent>) {
        while let Some(event) = events.recv().await {
            match event {
                InboundEvent::NewMessage(message) => {
                    if let Err(err) = self.handle_message(&message).await {
                        warn!(message_id = %message.id, error = %err, "failed to start reply");
                    }
                }
                InboundEvent::StopGenerating(signal) => {
                    self.stop_generating(signal);
                }
            }
        }
        self.shutdown();
    }

    /// Ask every active reply to stop. Coordinators cancel their runs and
    /// remove themselves as they dispose.
    pub fn shutdown(&self) {
        for message_id in self.active_replies() {
            if !self.stop_signals.dispatch(StopGenerating::new(message_id.clone())) {
                // No listener left; the task is past the point of reacting.
                if let Ok(mut active) = self.active.lock() {
                    if let Some(handle) = active.remove(&message_id) {
                        handle.abort();
                    }
                }
            }
        }
    }
}

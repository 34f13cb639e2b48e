//! Streaming response coordinator.
//!
//! One coordinator owns the lifecycle of one AI reply: it consumes the run
//! event stream, mirrors text deltas into the chat message (throttled),
//! answers tool calls and resumes the run, and tears down exactly once on
//! completion, failure, or a stop-generating signal.
//!
//! The outer loop is a small state machine:
//!
//! ```text
//! Streaming(stream) --requires_action--> Resubmitting { run_id, outputs }
//! Resubmitting      --submitted--------> Streaming(continuation)
//! Streaming         --completed/failed-> Done
//! ```

pub mod classify;
pub mod throttle;

use std::sync::Arc;
use std::time::Duration;

use bon::bon;
use futures::StreamExt;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use crate::chat::{
    AiState, ChannelEvent, ChatClient, MessageUpdate, ReplyMessage, StopGenerating, StopSignals,
    StopSubscription, GENERIC_ERROR_TEXT,
};
use crate::config::DEFAULT_THROTTLE;
use crate::error::{BridgeError, Result};
use crate::provider::AssistantClient;
use crate::tools::ToolInvoker;
use crate::types::{RunEventStream, RunStreamEvent, ToolOutput};

pub use classify::{classify, RunSignal};
pub use throttle::UpdateThrottler;

/// Called once with the reply message id when a coordinator disposes.
pub type DisposeCallback = Box<dyn FnOnce(&str) + Send>;

/// What the event loop does after one event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// Keep reading the current stream.
    Continue,
    /// The run is waiting on these outputs.
    Resubmit {
        run_id: String,
        outputs: Vec<ToolOutput>,
    },
    /// The run reached a terminal state, or the coordinator is disposed.
    Finished,
}

enum Phase {
    Streaming(RunEventStream),
    Resubmitting {
        run_id: String,
        outputs: Vec<ToolOutput>,
    },
    Done,
}

enum Next {
    Stop(Option<StopGenerating>),
    Event(Option<Result<RunStreamEvent>>),
}

/// Drives one AI reply from first event to disposal.
pub struct ResponseCoordinator {
    client: Arc<dyn AssistantClient>,
    chat: Arc<dyn ChatClient>,
    stop_signals: StopSignals,
    tools: ToolInvoker,
    thread_id: String,
    message: ReplyMessage,
    stream: Option<RunEventStream>,
    subscription: Option<StopSubscription>,
    on_dispose: Option<DisposeCallback>,
    throttler: UpdateThrottler,
    text: String,
    chunk_counter: usize,
    run_id: String,
    disposed: bool,
}

impl std::fmt::Debug for ResponseCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCoordinator")
            .field("thread_id", &self.thread_id)
            .field("message_id", &self.message.id)
            .field("run_id", &self.run_id)
            .field("chunks", &self.chunk_counter)
            .field("disposed", &self.disposed)
            .finish()
    }
}

#[bon]
impl ResponseCoordinator {
    /// Build a coordinator and start listening for stop signals on the reply
    /// message id.
    #[builder]
    pub fn new(
        client: Arc<dyn AssistantClient>,
        chat: Arc<dyn ChatClient>,
        stop_signals: StopSignals,
        #[builder(into)] thread_id: String,
        stream: RunEventStream,
        message: ReplyMessage,
        #[builder(default)] tools: ToolInvoker,
        #[builder(default = DEFAULT_THROTTLE)] throttle: Duration,
        on_dispose: Option<DisposeCallback>,
    ) -> Self {
        let subscription = stop_signals.subscribe(message.id.clone());
        Self {
            client,
            chat,
            stop_signals,
            tools,
            thread_id,
            message,
            stream: Some(stream),
            subscription: Some(subscription),
            on_dispose,
            throttler: UpdateThrottler::new(throttle),
            text: String::new(),
            chunk_counter: 0,
            run_id: String::new(),
            disposed: false,
        }
    }
}

impl ResponseCoordinator {
    pub fn message(&self) -> &ReplyMessage {
        &self.message
    }

    /// Text accumulated so far (the local mirror of the reply).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current run id; empty until the run announces itself.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_counter
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Drive the reply to completion. Always ends disposed; a call after
    /// disposal does nothing.
    pub async fn run(&mut self) {
        if self.disposed {
            return;
        }
        let Some(stream) = self.stream.take() else {
            return;
        };

        if let Err(err) = self.drive(stream).await {
            error!(
                message_id = %self.message.id,
                run_id = %self.run_id,
                error = %err,
                "response stream failed"
            );
            self.handle_error(&err).await;
        }
        self.dispose();
    }

    async fn drive(&mut self, stream: RunEventStream) -> Result<()> {
        let mut phase = Phase::Streaming(stream);
        loop {
            phase = match phase {
                Phase::Streaming(stream) => self.consume(stream).await?,
                Phase::Resubmitting { run_id, outputs } => {
                    let pending = self.subscription.as_mut().and_then(|s| s.try_recv());
                    if let Some(signal) = pending {
                        self.handle_stop(signal).await;
                        if self.disposed {
                            return Ok(());
                        }
                    }
                    debug!(
                        message_id = %self.message.id,
                        run_id = %run_id,
                        outputs = outputs.len(),
                        "resuming run with tool outputs"
                    );
                    let stream = self
                        .client
                        .submit_tool_outputs(&self.thread_id, &run_id, &outputs)
                        .await?;
                    Phase::Streaming(stream)
                }
                Phase::Done => return Ok(()),
            };
            if self.disposed {
                return Ok(());
            }
        }
    }

    async fn consume(&mut self, mut stream: RunEventStream) -> Result<Phase> {
        loop {
            let next = match self.subscription.as_mut() {
                Some(subscription) => tokio::select! {
                    biased;
                    signal = subscription.recv() => Next::Stop(signal),
                    event = stream.next() => Next::Event(event),
                },
                None => Next::Event(stream.next().await),
            };

            match next {
                Next::Stop(Some(signal)) => {
                    self.handle_stop(signal).await;
                    if self.disposed {
                        return Ok(Phase::Done);
                    }
                }
                Next::Stop(None) => {
                    // Listener was replaced in the registry; nothing more will arrive.
                    self.subscription = None;
                }
                Next::Event(None) => return self.finish_unterminated().await,
                Next::Event(Some(event)) => match self.apply_event(event?).await? {
                    EventOutcome::Continue => {}
                    EventOutcome::Resubmit { run_id, outputs } => {
                        return Ok(Phase::Resubmitting { run_id, outputs })
                    }
                    EventOutcome::Finished => return Ok(Phase::Done),
                },
            }
        }
    }

    /// Apply one run event. After disposal this is a no-op returning
    /// [`EventOutcome::Finished`].
    pub async fn apply_event(&mut self, event: RunStreamEvent) -> Result<EventOutcome> {
        if self.disposed {
            trace!(event = %event.event, "dropping event after disposal");
            return Ok(EventOutcome::Finished);
        }

        match classify(&event)? {
            RunSignal::RunCreated { run_id } => {
                debug!(message_id = %self.message.id, run_id = %run_id, "run created");
                self.run_id = run_id;
            }
            RunSignal::TextDelta { text } => {
                self.text.push_str(&text);
                if self.throttler.try_acquire(Instant::now()) {
                    self.push_text().await?;
                }
                self.chunk_counter += 1;
            }
            RunSignal::MessageCompleted { text } => {
                if let Some(text) = text {
                    self.text = text;
                }
                self.push_text().await?;
                self.send_event(ChannelEvent::IndicatorClear).await?;
            }
            RunSignal::MessageCreationStep => {
                self.send_event(ChannelEvent::state(AiState::CheckingSources))
                    .await?;
            }
            RunSignal::RequiresAction { run_id, calls } => {
                self.run_id = run_id.clone();
                self.send_event(ChannelEvent::state(AiState::ExternalSources))
                    .await?;
                info!(
                    message_id = %self.message.id,
                    run_id = %run_id,
                    calls = calls.len(),
                    "run requires tool outputs"
                );
                let outputs = self.tools.invoke_all(&calls).await;
                return Ok(EventOutcome::Resubmit { run_id, outputs });
            }
            RunSignal::RunCompleted => {
                info!(
                    message_id = %self.message.id,
                    run_id = %self.run_id,
                    chunks = self.chunk_counter,
                    "run completed"
                );
                return Ok(EventOutcome::Finished);
            }
            RunSignal::RunFailed { message } => {
                let err = BridgeError::RunFailed(message.unwrap_or_default());
                warn!(
                    message_id = %self.message.id,
                    run_id = %self.run_id,
                    error = %err,
                    "run failed"
                );
                self.handle_error(&err).await;
                return Ok(EventOutcome::Finished);
            }
            RunSignal::Ignored => {
                trace!(event = %event.event, "ignoring run event");
            }
        }
        Ok(EventOutcome::Continue)
    }

    /// React to a stop-generating signal. Ignored after disposal or when the
    /// signal is for another message.
    pub async fn handle_stop(&mut self, signal: StopGenerating) {
        if self.disposed || signal.message_id != self.message.id {
            debug!(
                message_id = %self.message.id,
                signal_message_id = %signal.message_id,
                "ignoring stop signal"
            );
            return;
        }

        info!(message_id = %self.message.id, run_id = %self.run_id, "stop generating");
        if !self.run_id.is_empty() {
            if let Err(err) = self.client.cancel_run(&self.thread_id, &self.run_id).await {
                warn!(run_id = %self.run_id, error = %err, "failed to cancel run");
            }
        }
        if let Err(err) = self.send_event(ChannelEvent::IndicatorClear).await {
            warn!(message_id = %self.message.id, error = %err, "failed to clear indicator");
        }
        self.dispose();
    }

    /// Report a terminal failure in the reply and dispose.
    pub async fn handle_error(&mut self, err: &BridgeError) {
        if self.disposed {
            return;
        }

        if let Err(send_err) = self.send_event(ChannelEvent::state(AiState::Error)).await {
            warn!(message_id = %self.message.id, error = %send_err, "failed to send error state");
        }
        let text = err.user_message();
        let text = if text.trim().is_empty() {
            GENERIC_ERROR_TEXT.to_string()
        } else {
            text
        };
        let update = MessageUpdate::error(text, err.to_string());
        match self
            .chat
            .partial_update_message(&self.message.id, update.clone())
            .await
        {
            Ok(()) => self.message.text = update.text,
            Err(update_err) => {
                warn!(
                    message_id = %self.message.id,
                    error = %update_err,
                    "failed to write error reply"
                );
            }
        }
        self.dispose();
    }

    /// One-shot teardown: unsubscribe from stop signals and notify the owner.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.stream = None;
        if let Some(subscription) = self.subscription.take() {
            self.stop_signals.unsubscribe(&subscription);
        }
        if let Some(on_dispose) = self.on_dispose.take() {
            on_dispose(&self.message.id);
        }
        debug!(
            message_id = %self.message.id,
            chunks = self.chunk_counter,
            "coordinator disposed"
        );
    }

    async fn finish_unterminated(&mut self) -> Result<Phase> {
        warn!(
            message_id = %self.message.id,
            run_id = %self.run_id,
            "run stream ended without a terminal event"
        );
        if !self.text.is_empty() && self.text != self.message.text {
            self.push_text().await?;
        }
        self.send_event(ChannelEvent::IndicatorClear).await?;
        Ok(Phase::Done)
    }

    async fn push_text(&mut self) -> Result<()> {
        self.chat
            .partial_update_message(&self.message.id, MessageUpdate::text(self.text.clone()))
            .await?;
        self.message.text.clone_from(&self.text);
        Ok(())
    }

    async fn send_event(&mut self, event: ChannelEvent) -> Result<()> {
        self.chat
            .send_event(&self.message.channel_id, &self.message.id, event)
            .await
    }
}

/// A coordinator dropped mid-reply (aborted or panicked task) still
/// releases its stop listener and runs the dispose callback.
impl Drop for ResponseCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

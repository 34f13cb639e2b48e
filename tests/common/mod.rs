//! Shared test helpers: scripted assistant client and recording chat.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use assistant_bridge::chat::{ChannelEvent, ChatClient, MessageUpdate, ReplyMessage, StopSignals};
use assistant_bridge::coordinator::{DisposeCallback, ResponseCoordinator};
use assistant_bridge::error::BridgeError;
use assistant_bridge::provider::{AssistantClient, AssistantSpec};
use assistant_bridge::tools::ToolInvoker;
use assistant_bridge::types::{RunEventStream, RunStreamEvent, ToolOutput};

pub const THREAD_ID: &str = "thread_1";
pub const CHANNEL_ID: &str = "messaging:general";
pub const REPLY_ID: &str = "reply_1";

/// Stream that yields `events` immediately and ends.
pub fn stream_of(events: Vec<RunStreamEvent>) -> RunEventStream {
    Box::pin(futures::stream::iter(events.into_iter().map(Ok)))
}

/// Stream that yields raw results (for injecting transport errors).
pub fn results_of(items: Vec<Result<RunStreamEvent, BridgeError>>) -> RunEventStream {
    Box::pin(futures::stream::iter(items))
}

/// Stream that sleeps `gap` before each event.
pub fn spaced(events: Vec<RunStreamEvent>, gap: Duration) -> RunEventStream {
    Box::pin(async_stream::stream! {
        for event in events {
            tokio::time::sleep(gap).await;
            yield Ok(event);
        }
    })
}

/// Stream that yields `events` and then never ends.
pub fn then_pending(events: Vec<RunStreamEvent>) -> RunEventStream {
    use futures::StreamExt;
    Box::pin(
        futures::stream::iter(events.into_iter().map(Ok)).chain(futures::stream::pending()),
    )
}

pub fn reply() -> ReplyMessage {
    ReplyMessage {
        id: REPLY_ID.to_string(),
        channel_id: CHANNEL_ID.to_string(),
        text: String::new(),
        ai_generated: true,
        created_at: None,
    }
}

/// Assistant client whose run streams are scripted in advance.
#[derive(Default)]
pub struct MockAssistantClient {
    runs: Mutex<VecDeque<RunEventStream>>,
    continuations: Mutex<VecDeque<Vec<RunStreamEvent>>>,
    fail_submit: bool,
    fail_cancel: bool,
    pub assistants: Mutex<Vec<AssistantSpec>>,
    pub threads: AtomicUsize,
    pub messages: Mutex<Vec<(String, String)>>,
    pub submissions: Mutex<Vec<(String, String, Vec<ToolOutput>)>>,
    pub cancels: Mutex<Vec<(String, String)>>,
}

impl MockAssistantClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_submit() -> Self {
        Self {
            fail_submit: true,
            ..Self::default()
        }
    }

    pub fn failing_cancel() -> Self {
        Self {
            fail_cancel: true,
            ..Self::default()
        }
    }

    /// Queue the events returned by the next `stream_run`.
    pub fn queue_run(&self, events: Vec<RunStreamEvent>) {
        self.queue_run_stream(stream_of(events));
    }

    /// Queue an arbitrary stream for the next `stream_run`.
    pub fn queue_run_stream(&self, stream: RunEventStream) {
        self.runs.lock().unwrap().push_back(stream);
    }

    /// Queue the events returned by the next `submit_tool_outputs`.
    pub fn queue_continuation(&self, events: Vec<RunStreamEvent>) {
        self.continuations.lock().unwrap().push_back(events);
    }

    pub fn submissions(&self) -> Vec<(String, String, Vec<ToolOutput>)> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn cancels(&self) -> Vec<(String, String)> {
        self.cancels.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssistantClient for MockAssistantClient {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<String, BridgeError> {
        let mut assistants = self.assistants.lock().unwrap();
        assistants.push(spec.clone());
        Ok(format!("asst_{}", assistants.len()))
    }

    async fn create_thread(&self) -> Result<String, BridgeError> {
        let n = self.threads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("thread_{n}"))
    }

    async fn add_message(&self, thread_id: &str, text: &str) -> Result<(), BridgeError> {
        self.messages
            .lock()
            .unwrap()
            .push((thread_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn stream_run(
        &self,
        _thread_id: &str,
        _assistant_id: &str,
    ) -> Result<RunEventStream, BridgeError> {
        let stream = self.runs.lock().unwrap().pop_front();
        Ok(stream.unwrap_or_else(|| stream_of(Vec::new())))
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunEventStream, BridgeError> {
        self.submissions.lock().unwrap().push((
            thread_id.to_string(),
            run_id.to_string(),
            outputs.to_vec(),
        ));
        if self.fail_submit {
            return Err(BridgeError::api(500, "submit failed"));
        }
        let events = self
            .continuations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        Ok(stream_of(events))
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), BridgeError> {
        self.cancels
            .lock()
            .unwrap()
            .push((thread_id.to_string(), run_id.to_string()));
        if self.fail_cancel {
            return Err(BridgeError::api(400, "run is not cancellable"));
        }
        Ok(())
    }
}

/// One recorded chat-side call.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCall {
    Sent {
        channel_id: String,
        text: String,
        ai_generated: bool,
    },
    Event {
        channel_id: String,
        message_id: String,
        event: ChannelEvent,
    },
    Update {
        message_id: String,
        update: MessageUpdate,
        at: Instant,
    },
}

/// Chat client that records every call.
#[derive(Default)]
pub struct RecordingChat {
    calls: Mutex<Vec<ChatCall>>,
    sent: AtomicUsize,
    fail_updates: bool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_updates() -> Self {
        Self {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<ChannelEvent> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Event { event, .. } => Some(event),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<MessageUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Update { update, .. } => Some(update),
                _ => None,
            })
            .collect()
    }

    pub fn update_texts(&self) -> Vec<String> {
        self.updates().into_iter().map(|u| u.text).collect()
    }

    pub fn update_times(&self) -> Vec<Instant> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ChatCall::Update { at, .. } => Some(at),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
        ai_generated: bool,
    ) -> Result<ReplyMessage, BridgeError> {
        let n = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        self.calls.lock().unwrap().push(ChatCall::Sent {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
            ai_generated,
        });
        Ok(ReplyMessage {
            id: format!("reply_{n}"),
            channel_id: channel_id.to_string(),
            text: text.to_string(),
            ai_generated,
            created_at: Some(chrono::Utc::now()),
        })
    }

    async fn send_event(
        &self,
        channel_id: &str,
        message_id: &str,
        event: ChannelEvent,
    ) -> Result<(), BridgeError> {
        self.calls.lock().unwrap().push(ChatCall::Event {
            channel_id: channel_id.to_string(),
            message_id: message_id.to_string(),
            event,
        });
        Ok(())
    }

    async fn partial_update_message(
        &self,
        message_id: &str,
        update: MessageUpdate,
    ) -> Result<(), BridgeError> {
        if self.fail_updates {
            return Err(BridgeError::Chat("update rejected".to_string()));
        }
        self.calls.lock().unwrap().push(ChatCall::Update {
            message_id: message_id.to_string(),
            update,
            at: Instant::now(),
        });
        Ok(())
    }
}

/// Everything a coordinator test needs to inspect afterwards.
pub struct Harness {
    pub client: Arc<MockAssistantClient>,
    pub chat: Arc<RecordingChat>,
    pub stop_signals: StopSignals,
    pub disposals: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(client: MockAssistantClient) -> Self {
        Self::with_chat(client, RecordingChat::new())
    }

    pub fn with_chat(client: MockAssistantClient, chat: RecordingChat) -> Self {
        Self {
            client: Arc::new(client),
            chat: Arc::new(chat),
            stop_signals: StopSignals::new(),
            disposals: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn disposals(&self) -> usize {
        self.disposals.load(Ordering::SeqCst)
    }

    fn on_dispose(&self) -> DisposeCallback {
        let disposals = Arc::clone(&self.disposals);
        Box::new(move |_message_id: &str| {
            disposals.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Coordinator for [`REPLY_ID`] with the default throttle.
    pub fn coordinator(&self, stream: RunEventStream, tools: ToolInvoker) -> ResponseCoordinator {
        ResponseCoordinator::builder()
            .client(self.client.clone())
            .chat(self.chat.clone())
            .stop_signals(self.stop_signals.clone())
            .thread_id(THREAD_ID)
            .stream(stream)
            .message(reply())
            .tools(tools)
            .on_dispose(self.on_dispose())
            .build()
    }
}

//! Stop-generating signals, routed to listeners keyed by message id.
//!
//! Each coordinator subscribes under its reply message id and receives the
//! signals for that id on an unbounded channel. The subscription token is
//! required to unsubscribe, so a stale token never removes a newer listener
//! registered under the same id.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Inbound "stop generating" request for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopGenerating {
    pub message_id: String,
}

impl StopGenerating {
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
        }
    }
}

struct Listener {
    token: u64,
    tx: mpsc::UnboundedSender<StopGenerating>,
}

/// Observer registry for stop signals.
#[derive(Clone, Default)]
pub struct StopSignals {
    listeners: Arc<Mutex<HashMap<String, Listener>>>,
    next_token: Arc<AtomicU64>,
}

impl std::fmt::Debug for StopSignals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignals")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Capability returned by [`StopSignals::subscribe`].
#[derive(Debug)]
pub struct StopSubscription {
    message_id: String,
    token: u64,
    rx: mpsc::UnboundedReceiver<StopGenerating>,
}

impl StopSubscription {
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Wait for the next signal. Returns `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<StopGenerating> {
        self.rx.recv().await
    }

    /// Take a signal that has already arrived, without waiting.
    pub fn try_recv(&mut self) -> Option<StopGenerating> {
        self.rx.try_recv().ok()
    }
}

impl StopSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `message_id`, replacing any previous one.
    pub fn subscribe(&self, message_id: impl Into<String>) -> StopSubscription {
        let message_id = message_id.into();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.insert(message_id.clone(), Listener { token, tx });
        }
        StopSubscription {
            message_id,
            token,
            rx,
        }
    }

    /// Remove the listener registered by `subscription`.
    ///
    /// Returns `true` if a listener was removed.
    pub fn unsubscribe(&self, subscription: &StopSubscription) -> bool {
        let Ok(mut listeners) = self.listeners.lock() else {
            return false;
        };
        match listeners.get(&subscription.message_id) {
            Some(listener) if listener.token == subscription.token => {
                listeners.remove(&subscription.message_id);
                true
            }
            _ => false,
        }
    }

    /// Deliver a signal to the listener for its message id.
    ///
    /// Returns `true` if a listener received it.
    pub fn dispatch(&self, signal: StopGenerating) -> bool {
        let Ok(listeners) = self.listeners.lock() else {
            return false;
        };
        match listeners.get(&signal.message_id) {
            Some(listener) => listener.tx.send(signal).is_ok(),
            None => {
                tracing::debug!(message_id = %signal.message_id, "no listener for stop signal");
                false
            }
        }
    }

    /// Message ids with a live listener.
    pub fn message_ids(&self) -> Vec<String> {
        self.listeners
            .lock()
            .map(|listeners| listeners.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

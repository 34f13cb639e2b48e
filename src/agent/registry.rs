//! Sessions keyed by channel id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::session::AssistantSession;
use crate::chat::ChatClient;
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::provider::AssistantClient;
use crate::tools::ToolInvoker;

/// Starts at most one [`AssistantSession`] per channel.
pub struct AgentRegistry {
    client: Arc<dyn AssistantClient>,
    chat: Arc<dyn ChatClient>,
    tools: ToolInvoker,
    config: BridgeConfig,
    sessions: Mutex<HashMap<String, Arc<AssistantSession>>>,
}

impl AgentRegistry {
    pub fn new(
        client: Arc<dyn AssistantClient>,
        chat: Arc<dyn ChatClient>,
        tools: ToolInvoker,
        config: BridgeConfig,
    ) -> Self {
        Self {
            client,
            chat,
            tools,
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Return the channel's session, starting one if needed.
    pub async fn get_or_start(&self, channel_id: &str) -> Result<Arc<AssistantSession>> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(channel_id) {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(
            AssistantSession::start(
                Arc::clone(&self.client),
                Arc::clone(&self.chat),
                self.tools.clone(),
                self.config.clone(),
                channel_id,
            )
            .await?,
        );
        sessions.insert(channel_id.to_string(), Arc::clone(&session));
        Ok(session)
    }

    pub async fn get(&self, channel_id: &str) -> Option<Arc<AssistantSession>> {
        self.sessions.lock().await.get(channel_id).cloned()
    }

    /// Stop a channel's session. Returns `false` if none was running.
    pub async fn stop(&self, channel_id: &str) -> bool {
        let session = self.sessions.lock().await.remove(channel_id);
        match session {
            Some(session) => {
                session.shutdown();
                tracing::info!(channel_id, "session stopped");
                true
            }
            None => false,
        }
    }

    pub async fn channel_ids(&self) -> Vec<String> {
        self.sessions.lock().await.keys().cloned().collect()
    }
}

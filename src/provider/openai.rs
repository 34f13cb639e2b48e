//! OpenAI Assistants v2 client (threads, streamed runs, run control).

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, trace};

use super::http::{bearer_headers, shared_client, status_to_error, SseDecoder, SseFrame};
use super::{AssistantClient, AssistantSpec};
use crate::config::{self, BridgeConfig};
use crate::error::{BridgeError, Result};
use crate::types::{RunEventStream, RunStreamEvent, ToolOutput};

/// Assistants API client.
#[derive(Debug, Clone)]
pub struct OpenAiAssistants {
    api_key: String,
    base_url: String,
}

#[derive(Deserialize)]
struct IdObject {
    id: String,
}

impl OpenAiAssistants {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build from config; fails when no OpenAI key is configured.
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let api_key = config.get_api_key(config::OPENAI).ok_or_else(|| {
            BridgeError::Configuration("OPENAI_API_KEY is not set".to_string())
        })?;
        Ok(Self::new(api_key, config.base_url_or_default(config::OPENAI)))
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = bearer_headers(&self.api_key);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("assistants=v2"));
        headers
    }

    async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.base_url);
        let resp = shared_client()
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }
        Ok(resp)
    }

    async fn post_for_id(&self, path: &str, body: &serde_json::Value) -> Result<String> {
        let resp = self.post_json(path, body).await?;
        let object: IdObject = resp.json().await?;
        Ok(object.id)
    }

    async fn post_stream(&self, path: &str, body: &serde_json::Value) -> Result<RunEventStream> {
        let resp = self.post_json(path, body).await?;
        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut decoder = SseDecoder::new();
            futures::pin_mut!(byte_stream);

            'body: while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(BridgeError::Network(e));
                        break;
                    }
                };

                for frame in decoder.push(&chunk) {
                    if frame.is_done() {
                        break 'body;
                    }
                    if let Some(event) = frame_to_event(frame) {
                        yield Ok(event);
                    }
                }
            }

            if let Some(frame) = decoder.finish() {
                if !frame.is_done() {
                    if let Some(event) = frame_to_event(frame) {
                        yield Ok(event);
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

fn frame_to_event(frame: SseFrame) -> Option<RunStreamEvent> {
    let Some(event) = frame.event else {
        trace!(data = %frame.data, "skipping untagged SSE frame");
        return None;
    };
    match serde_json::from_str::<serde_json::Value>(&frame.data) {
        Ok(data) => Some(RunStreamEvent::new(event, data)),
        Err(_) => {
            trace!(event = %event, "skipping unparseable SSE frame");
            None
        }
    }
}

#[async_trait]
impl AssistantClient for OpenAiAssistants {
    async fn create_assistant(&self, spec: &AssistantSpec) -> Result<String> {
        let tools: Vec<serde_json::Value> = spec
            .tools
            .iter()
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();
        let mut body = serde_json::json!({
            "model": spec.model,
            "instructions": spec.instructions,
            "tools": tools,
        });
        if let Some(name) = &spec.name {
            body["name"] = serde_json::Value::String(name.clone());
        }

        debug!(model = spec.model.as_str(), "creating assistant");
        self.post_for_id("/assistants", &body).await
    }

    async fn create_thread(&self) -> Result<String> {
        self.post_for_id("/threads", &serde_json::json!({})).await
    }

    async fn add_message(&self, thread_id: &str, text: &str) -> Result<()> {
        let body = serde_json::json!({ "role": "user", "content": text });
        self.post_json(&format!("/threads/{thread_id}/messages"), &body)
            .await?;
        Ok(())
    }

    async fn stream_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunEventStream> {
        debug!(thread_id, assistant_id, "starting streamed run");
        let body = serde_json::json!({ "assistant_id": assistant_id, "stream": true });
        self.post_stream(&format!("/threads/{thread_id}/runs"), &body)
            .await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<RunEventStream> {
        debug!(thread_id, run_id, outputs = outputs.len(), "submitting tool outputs");
        let body = serde_json::json!({ "tool_outputs": outputs, "stream": true });
        self.post_stream(
            &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            &body,
        )
        .await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<()> {
        self.post_json(
            &format!("/threads/{thread_id}/runs/{run_id}/cancel"),
            &serde_json::json!({}),
        )
        .await?;
        Ok(())
    }
}

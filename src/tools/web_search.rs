//! `web_search` tool backed by the Tavily search API.

use async_trait::async_trait;
use bon::Builder;
use serde::Serialize;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::tool::Tool;
use super::types::{ToolParameters, ToolPayload};
use crate::config::{self, BridgeConfig};
use crate::error::BridgeError;
use crate::provider::http::{bearer_headers, shared_client};

pub const WEB_SEARCH_TOOL: &str = "web_search";

pub const NOT_CONFIGURED_ERROR: &str = "Web search is not available. API key not configured.";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred during web search";

/// Body of a search request.
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct SearchRequest {
    #[builder(into)]
    pub query: String,
    #[builder(into, default = "advanced".to_string())]
    pub search_depth: String,
    #[builder(default = 5)]
    pub max_results: u32,
    #[builder(default = true)]
    pub include_answer: bool,
    #[builder(default = false)]
    pub include_raw_content: bool,
}

/// Searches the web and returns the provider's JSON response.
///
/// Never fails: a missing credential, an HTTP error, or a transport error is
/// reported as a [`ToolPayload::Failure`].
#[derive(Debug, Clone)]
pub struct WebSearchTool {
    config: BridgeConfig,
    search_depth: String,
    max_results: u32,
    parameters: ToolParameters,
}

impl WebSearchTool {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            search_depth: "advanced".to_string(),
            max_results: 5,
            parameters: ToolParameters::object()
                .string("query", "The search query", true)
                .build(),
        }
    }

    pub fn with_search_depth(mut self, depth: impl Into<String>) -> Self {
        self.search_depth = depth.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    /// Run one search.
    pub async fn search(&self, query: &str) -> ToolPayload {
        let Some(api_key) = self.config.get_api_key(config::TAVILY) else {
            warn!("web search requested but TAVILY_API_KEY is not configured");
            return ToolPayload::failure(NOT_CONFIGURED_ERROR);
        };

        let request = SearchRequest::builder()
            .query(query)
            .search_depth(self.search_depth.clone())
            .max_results(self.max_results)
            .build();
        let url = format!("{}/search", self.config.base_url_or_default(config::TAVILY));
        debug!(query, url = %url, "web search");

        let resp = match shared_client()
            .post(&url)
            .headers(bearer_headers(&api_key))
            .json(&request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(err) => {
                warn!(error = %err, "web search request failed");
                return ToolPayload::failure_with_details(
                    "Search failed",
                    serde_json::Value::String(err.to_string()),
                );
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "web search provider returned an error");
            let details = serde_json::from_str::<serde_json::Value>(&body)
                .unwrap_or(serde_json::Value::String(body));
            return ToolPayload::failure_with_details(
                format!("Search failed with status: {}", status.as_u16()),
                details,
            );
        }

        match resp.json::<serde_json::Value>().await {
            Ok(body) => ToolPayload::Success(body),
            Err(err) => {
                warn!(error = %err, "web search response was not JSON");
                ToolPayload::failure(UNEXPECTED_ERROR)
            }
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns an answer summary and result snippets."
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<ToolPayload, BridgeError> {
        let query = args.get_str("query")?;
        Ok(self.search(query).await)
    }
}

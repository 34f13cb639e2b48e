//! Tests for the web search tool against a mock search API.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use assistant_bridge::config::{self, BridgeConfig};
use assistant_bridge::tools::{
    Tool, ToolArguments, ToolInvoker, ToolPayload, WebSearchTool, NOT_CONFIGURED_ERROR,
    UNEXPECTED_ERROR,
};
use assistant_bridge::types::ToolCallRequest;

fn config_for(server: &MockServer, api_key: Option<&str>) -> BridgeConfig {
    let config = BridgeConfig::new();
    config.set_base_url(config::TAVILY, server.uri());
    if let Some(key) = api_key {
        config.set_api_key(config::TAVILY, key.to_string());
    }
    config
}

#[tokio::test]
async fn missing_key_returns_error_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(config_for(&server, None));
    let payload = tool.search("weather in Paris").await;

    assert_eq!(payload, ToolPayload::failure(NOT_CONFIGURED_ERROR));
    assert_eq!(payload.to_json(), json!({ "error": NOT_CONFIGURED_ERROR }));
}

#[tokio::test]
async fn successful_search_returns_provider_body() {
    let server = MockServer::start().await;
    let body = json!({
        "query": "weather in Paris",
        "answer": "Sunny, 21°C",
        "results": [
            { "title": "Paris forecast", "url": "https://example.com/paris", "content": "Sunny" }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("authorization", "Bearer tvly-test"))
        .and(body_partial_json(json!({
            "query": "weather in Paris",
            "search_depth": "advanced",
            "max_results": 5,
            "include_answer": true,
            "include_raw_content": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(config_for(&server, Some("tvly-test")));
    let payload = tool.search("weather in Paris").await;

    assert_eq!(payload, ToolPayload::Success(body));
}

#[tokio::test]
async fn search_options_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "search_depth": "basic", "max_results": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(config_for(&server, Some("tvly-test")))
        .with_search_depth("basic")
        .with_max_results(2);

    assert!(!tool.search("rust").await.is_error());
}

#[tokio::test]
async fn http_error_status_is_reported_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "upstream exploded" })),
        )
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(config_for(&server, Some("tvly-test")));
    let payload = tool.search("anything").await;

    assert_eq!(
        payload.to_json(),
        json!({
            "error": "Search failed with status: 500",
            "details": { "detail": "upstream exploded" }
        })
    );
}

#[tokio::test]
async fn non_json_error_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(config_for(&server, Some("tvly-wrong")));
    let payload = tool.search("anything").await;

    assert_eq!(
        payload,
        ToolPayload::failure_with_details(
            "Search failed with status: 401",
            json!("invalid api key")
        )
    );
}

#[tokio::test]
async fn unparseable_success_body_is_unexpected_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let tool = WebSearchTool::new(config_for(&server, Some("tvly-test")));

    assert_eq!(tool.search("anything").await, ToolPayload::failure(UNEXPECTED_ERROR));
}

#[tokio::test]
async fn transport_failure_is_reported() {
    let config = BridgeConfig::new();
    config.set_api_key(config::TAVILY, "tvly-test".to_string());
    // Nothing listens on port 1.
    config.set_base_url(config::TAVILY, "http://127.0.0.1:1".to_string());

    let payload = WebSearchTool::new(config).search("anything").await;

    match payload {
        ToolPayload::Failure { error, details } => {
            assert_eq!(error, "Search failed");
            assert!(details.is_some_and(|d| d.is_string()));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn execute_requires_query_argument() {
    let tool = WebSearchTool::new(BridgeConfig::new());

    let err = tool
        .execute(&ToolArguments::new(json!({ "q": "typo" })))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("query"));
}

#[tokio::test]
async fn invoker_routes_run_calls_to_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({ "query": "latest rust release" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": "1.90" })))
        .expect(1)
        .mount(&server)
        .await;

    let invoker = ToolInvoker::new().with_tool(Arc::new(WebSearchTool::new(config_for(
        &server,
        Some("tvly-test"),
    ))));
    let output = invoker
        .invoke(&ToolCallRequest::new(
            "call_1",
            "web_search",
            json!({ "query": "latest rust release" }),
        ))
        .await;

    assert_eq!(output.tool_call_id, "call_1");
    assert_eq!(output.json().unwrap(), json!({ "answer": "1.90" }));
}

//! Integration tests for the xAI client against a mock Responses API.

use futures::StreamExt;
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use xai_mcp_server::config::XaiConfig;
use xai_mcp_server::error::XaiError;
use xai_mcp_server::mcp::{Dispatcher, JsonRpcRequest, RequestId};
use xai_mcp_server::tools::{Tool, ToolRegistry, XSearchTool};
use xai_mcp_server::xai::XaiClient;

const API_KEY: &str = "test-key";

fn config(server: &MockServer) -> XaiConfig {
    XaiConfig::new(API_KEY).with_base_url(format!("{}/v1", server.uri()))
}

fn message_body(text: &str) -> Value {
    json!({
        "id": "resp_123",
        "object": "response",
        "status": "completed",
        "model": "grok-4-1-fast",
        "output": [
            {"type": "x_search_call", "id": "xs_1", "status": "completed"},
            {
                "type": "message",
                "id": "msg_1",
                "role": "assistant",
                "content": [{
                    "type": "output_text",
                    "text": text,
                    "annotations": [
                        {"type": "url_citation", "url": "https://x.com/rustlang/status/1", "title": "Rust"},
                        {"type": "url_citation", "title": "No URL"}
                    ]
                }]
            }
        ]
    })
}

fn sse(frames: &[&str]) -> String {
    frames
        .iter()
        .map(|frame| format!("data: {frame}\n\n"))
        .collect()
}

fn text_frame(text: &str) -> String {
    json!({"output": [{"type": "message", "content": [{"type": "output_text", "text": text}]}]})
        .to_string()
}

async fn mount_json(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(server)
        .await;
}

// =============================================================================
// Non-streaming search
// =============================================================================

#[tokio::test]
async fn search_sends_single_turn_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "grok-4-1-fast",
            "input": [{"role": "user", "content": "rust news"}],
            "tools": [{"type": "x_search"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_body("All good.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = XaiClient::new(&config(&server));
    let result = client.search("rust news").await.unwrap();

    assert_eq!(result.id, "resp_123");
    assert_eq!(result.text, "All good.");
    assert_eq!(result.citations.len(), 2);
    assert_eq!(result.citations[1].url, None);
}

#[tokio::test]
async fn search_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = XaiClient::new(&config(&server)).search("q").await.unwrap_err();

    match err {
        XaiError::Api { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn search_without_message_item() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        200,
        json!({"id": "r", "object": "response", "status": "completed", "model": "m", "output": []}),
    )
    .await;

    let err = XaiClient::new(&config(&server)).search("q").await.unwrap_err();

    assert!(matches!(err, XaiError::NoMessageContent));
    assert_eq!(err.to_string(), "No message content in XAI response");
}

#[tokio::test]
async fn search_without_text_item() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        200,
        json!({"id": "r", "output": [{"type": "message", "content": [{"type": "refusal"}]}]}),
    )
    .await;

    let err = XaiClient::new(&config(&server)).search("q").await.unwrap_err();

    assert!(matches!(err, XaiError::NoTextContent));
}

#[tokio::test]
async fn search_with_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = XaiClient::new(&config(&server)).search("q").await.unwrap_err();

    assert!(matches!(err, XaiError::MalformedResponse(_)));
}

#[tokio::test]
async fn connection_failure_is_http_error() {
    // Nothing listens on port 1.
    let client = XaiClient::new(&XaiConfig::new(API_KEY).with_base_url("http://127.0.0.1:1/v1"));

    let err = client.search("q").await.unwrap_err();

    assert!(matches!(err, XaiError::Http(_)));
}

// =============================================================================
// Streaming search
// =============================================================================

#[tokio::test]
async fn stream_yields_fragments_until_done() {
    let server = MockServer::start().await;
    let hello = text_frame("Hello, ");
    let world = text_frame("world");
    mount_stream(&server, sse(&[&hello, "{not json", &world, "[DONE]"])).await;

    let client = XaiClient::new(&config(&server));
    let mut stream = client.search_stream("q").await.unwrap();

    assert_eq!(stream.next().await.unwrap().as_deref(), Some("Hello, "));
    assert_eq!(stream.next().await.unwrap().as_deref(), Some("world"));
    assert_eq!(stream.next().await.unwrap(), None);
    assert_eq!(stream.next().await.unwrap(), None);
}

#[tokio::test]
async fn stream_ends_at_end_of_body_without_done() {
    let server = MockServer::start().await;
    let only = text_frame("only");
    mount_stream(&server, format!("data: {only}")).await;

    let client = XaiClient::new(&config(&server));
    let text = client.search_stream("q").await.unwrap().collect_text().await.unwrap();

    assert_eq!(text, "only");
}

#[tokio::test]
async fn stream_ignores_frames_after_done() {
    let server = MockServer::start().await;
    let early = text_frame("early");
    let late = text_frame("late");
    mount_stream(&server, sse(&[&early, "[DONE]", &late])).await;

    let client = XaiClient::new(&config(&server));
    let fragments: Vec<String> = client
        .search_stream("q")
        .await
        .unwrap()
        .into_stream()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(fragments, vec!["early".to_string()]);
}

#[tokio::test]
async fn stream_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = XaiClient::new(&config(&server))
        .search_stream("q")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "XAI API error (429): slow down");
}

#[tokio::test]
async fn client_is_reusable_after_dropping_a_stream() {
    let server = MockServer::start().await;
    let a = text_frame("a");
    let b = text_frame("b");
    mount_stream(&server, sse(&[&a, &b, "[DONE]"])).await;
    mount_json(&server, 200, message_body("again")).await;

    let client = XaiClient::new(&config(&server));
    let mut stream = client.search_stream("q").await.unwrap();
    assert_eq!(stream.next().await.unwrap().as_deref(), Some("a"));
    drop(stream);

    let result = client.search("q").await.unwrap();

    assert_eq!(result.text, "again");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let second: Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert!(second.get("stream").is_none());
}

// =============================================================================
// End to end through the tool and dispatcher
// =============================================================================

#[tokio::test]
async fn tool_call_against_mock_api() {
    let server = MockServer::start().await;
    mount_json(&server, 200, message_body("Rust is trending.")).await;

    let dispatcher = xai_mcp_server::build_dispatcher(&config(&server));
    let response = dispatcher
        .handle(JsonRpcRequest::new(
            Some(RequestId::Number(1)),
            "tools/call",
            Some(json!({"name": "x_search", "arguments": {"query": "rust"}})),
        ))
        .await;

    let result = response.result().unwrap();
    assert_eq!(result["isError"], false);
    assert_eq!(
        result["content"][0]["text"],
        "Rust is trending.\n\n**Sources:**\n1. [Rust](https://x.com/rustlang/status/1)"
    );
}

#[tokio::test]
async fn tool_reports_upstream_failure_softly() {
    let server = MockServer::start().await;
    mount_json(&server, 500, json!({"error": "boom"})).await;

    let client = XaiClient::new(&config(&server));
    let tool = XSearchTool::new(std::sync::Arc::new(client));
    let mut args = Map::new();
    args.insert("query".to_string(), json!("q"));

    let result = tool.execute(&args).await;

    assert!(result.is_error);
    assert!(result
        .first_text()
        .unwrap()
        .starts_with("Error executing X search: XAI API error (500)"));

    let dispatcher = Dispatcher::new(ToolRegistry::new().with_tool(tool));
    assert_eq!(
        dispatcher.handle(JsonRpcRequest::new(None, "tools/list", None)).await.result().unwrap()["tools"][0]["name"],
        "x_search"
    );
}

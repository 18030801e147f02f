//! Integration tests for MCP protocol handling.
//!
//! These tests drive the dispatcher through the public API the transports
//! use: raw text is parsed, routed, and the serialised response checked.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use xai_mcp_server::error::XaiError;
use xai_mcp_server::mcp::{parse_message, Dispatcher, RequestId};
use xai_mcp_server::tools::{ToolRegistry, XSearchTool};
use xai_mcp_server::xai::{Citation, SearchProvider, SearchResult};

// =============================================================================
// Helpers
// =============================================================================

struct StaticProvider;

#[async_trait]
impl SearchProvider for StaticProvider {
    async fn search(&self, query: &str) -> Result<SearchResult, XaiError> {
        Ok(SearchResult {
            id: "resp_test".to_string(),
            text: format!("Results for {query}"),
            citations: vec![
                Citation {
                    kind: "url_citation".to_string(),
                    url: Some("https://x.com/a/status/1".to_string()),
                    title: Some("Post A".to_string()),
                    snippet: None,
                },
                Citation {
                    kind: "url_citation".to_string(),
                    url: None,
                    title: Some("No link".to_string()),
                    snippet: Some("dropped".to_string()),
                },
            ],
        })
    }
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(ToolRegistry::new().with_tool(XSearchTool::new(Arc::new(StaticProvider))))
}

async fn roundtrip(json: &str) -> Value {
    let response = match parse_message(json) {
        Ok(request) => dispatcher().handle(request).await,
        Err(response) => response,
    };
    serde_json::to_value(response).unwrap()
}

fn assert_envelope(value: &Value) {
    assert_eq!(value["jsonrpc"], "2.0");
    let has_result = value.get("result").is_some();
    let has_error = value.get("error").is_some();
    assert!(has_result ^ has_error, "exactly one of result/error: {value}");
}

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let req = parse_message(json).unwrap();
    assert_eq!(req.method, "initialize");
    assert_eq!(req.id, Some(RequestId::Number(1)));
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let req = parse_message(json).unwrap();
    assert!(req.is_notification());
}

#[test]
fn test_parse_invalid_json() {
    let err = parse_message("not valid json").unwrap_err();
    assert_eq!(err.error().unwrap().code, -32700);
}

// =============================================================================
// Dispatch Tests
// =============================================================================

#[tokio::test]
async fn test_initialize() {
    let value = roundtrip(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2099-01-01"}}"#,
    )
    .await;

    assert_envelope(&value);
    assert_eq!(value["id"], 1);
    assert!(!value["result"]["protocolVersion"].as_str().unwrap().is_empty());
    assert!(!value["result"]["serverInfo"]["name"].as_str().unwrap().is_empty());
    assert!(!value["result"]["serverInfo"]["version"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_tools_list() {
    let value = roundtrip(r#"{"jsonrpc":"2.0","id":"list","method":"tools/list","params":{}}"#).await;

    assert_envelope(&value);
    assert_eq!(value["id"], "list");
    let tools = value["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "x_search");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["query"]));
}

#[tokio::test]
async fn test_unknown_method() {
    let value = roundtrip(r#"{"jsonrpc":"2.0","id":4,"method":"bogus"}"#).await;

    assert_envelope(&value);
    assert_eq!(value["error"]["code"], -32601);
    assert!(value["error"]["message"].as_str().unwrap().contains("bogus"));
}

#[tokio::test]
async fn test_requests_missing_method_get_well_formed_errors() {
    for json in [
        r#"{"jsonrpc":"2.0","id":1}"#,
        r#"{"id":"x"}"#,
        r#"{}"#,
        r#"{"jsonrpc":"2.0","id":2,"params":{"a":1}}"#,
    ] {
        let value = roundtrip(json).await;
        assert_envelope(&value);
        assert_eq!(value["error"]["code"], -32601, "for {json}");
    }
}

#[tokio::test]
async fn test_tool_call_formats_citations() {
    let value = roundtrip(
        r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"x_search","arguments":{"query":"rust"}}}"#,
    )
    .await;

    assert_envelope(&value);
    assert_eq!(value["result"]["isError"], false);
    assert_eq!(
        value["result"]["content"][0]["text"],
        "Results for rust\n\n**Sources:**\n1. [Post A](https://x.com/a/status/1)"
    );
}

#[tokio::test]
async fn test_tool_call_missing_query_is_tool_error() {
    let value = roundtrip(
        r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"x_search","arguments":{}}}"#,
    )
    .await;

    assert_envelope(&value);
    assert_eq!(value["result"]["isError"], true);
    assert!(value.get("error").is_none());
}

#[tokio::test]
async fn test_unknown_tool_is_invalid_params() {
    let value = roundtrip(
        r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"web_search"}}"#,
    )
    .await;

    assert_envelope(&value);
    assert_eq!(value["error"]["code"], -32602);
    assert_eq!(value["id"], 6);
}

//! HTTP behaviour of the tool service client

use mockito::Matcher;
use ops_assistant_mcp::{FailureClass, McpError, McpHttpClient, ToolClient};
use serde_json::{json, Map, Value};
use std::time::Duration;

fn client_for(server: &mockito::Server) -> McpHttpClient {
    McpHttpClient::new(
        format!("{}/mcp/", server.url()),
        Duration::from_secs(5),
        true,
    )
    .expect("client should build")
}

fn args(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn test_list_tools_posts_rpc_and_caches() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/mcp/list_tools")
        .match_body(Matcher::Json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {"tools": [
                    {
                        "name": "get_job_templates",
                        "description": "List available job templates"
                    },
                    {
                        "name": "get_job_status",
                        "description": "Status of a job",
                        "inputSchema": {
                            "type": "object",
                            "properties": {"job_id": {"type": "integer"}},
                            "required": ["job_id"]
                        }
                    }
                ]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let tools = client.list_tools().await.unwrap();
    mock.assert_async().await;

    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0].name, "get_job_templates");
    assert_eq!(tools[0].input_schema["type"], "object");
    assert_eq!(tools[1].input_schema["required"][0], "job_id");
    assert_eq!(client.cached_tools(), tools);
}

#[tokio::test]
async fn test_list_tools_without_result_is_empty() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/mcp/list_tools")
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1}).to_string())
        .create_async()
        .await;

    let tools = client_for(&server).list_tools().await.unwrap();
    assert!(tools.is_empty());
}

#[tokio::test]
async fn test_list_tools_null_list_is_empty() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/mcp/list_tools")
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": {"tools": null}}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let tools = client.list_tools().await.unwrap();
    assert!(tools.is_empty());
    assert!(client.cached_tools().is_empty());
}

#[tokio::test]
async fn test_list_tools_keeps_cache_when_list_missing() {
    let mut server = mockito::Server::new_async().await;
    let listed = server
        .mock("POST", "/mcp/list_tools")
        .with_status(200)
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": {"tools": [{"name": "get_job_templates"}]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let first = client.list_tools().await.unwrap();
    assert_eq!(first.len(), 1);
    listed.remove_async().await;

    server
        .mock("POST", "/mcp/list_tools")
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": {}}).to_string())
        .create_async()
        .await;

    let second = client.list_tools().await.unwrap();
    assert!(second.is_empty());

    let cached = client.cached_tools();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].name, "get_job_templates");
}

#[tokio::test]
async fn test_list_tools_status_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/mcp/list_tools")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let err = client_for(&server).list_tools().await.unwrap_err();
    match &err {
        McpError::Status { status, body, .. } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "upstream unavailable");
        }
        other => panic!("Expected Status error, got {:?}", other),
    }
    assert_eq!(err.class(), FailureClass::Retryable);
}

#[tokio::test]
async fn test_call_tool_returns_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/mcp/call_tool")
        .match_body(Matcher::Json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": "get_job_status", "arguments": {"job_id": 42}}
        })))
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": {"status": "successful"}}).to_string())
        .create_async()
        .await;

    let result = client_for(&server)
        .call_tool("get_job_status", args(json!({"job_id": 42})))
        .await
        .unwrap();
    mock.assert_async().await;

    assert_eq!(result, Some(json!({"status": "successful"})));
}

#[tokio::test]
async fn test_call_tool_remote_error_verbatim() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/mcp/call_tool")
        .with_status(200)
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32602, "message": "Missing required parameter: template_id"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client_for(&server)
        .call_tool("launch_job_template", Map::new())
        .await
        .unwrap_err();

    match &err {
        McpError::Remote(payload) => {
            assert_eq!(payload["code"], -32602);
            assert_eq!(payload["message"], "Missing required parameter: template_id");
        }
        other => panic!("Expected Remote error, got {:?}", other),
    }
    assert_eq!(err.class(), FailureClass::Parameter);
}

#[tokio::test]
async fn test_call_tool_without_result_or_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/mcp/call_tool")
        .with_status(200)
        .with_body(json!({"jsonrpc": "2.0", "id": 1}).to_string())
        .create_async()
        .await;

    let result = client_for(&server)
        .call_tool("get_host_inventories", Map::new())
        .await
        .unwrap();
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/mcp/call_tool")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .call_tool("get_job_output", Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_retryable() {
    // Nothing listens on port 9 of the loopback interface
    let client = McpHttpClient::new("http://127.0.0.1:9/mcp", Duration::from_secs(2), true).unwrap();

    let err = client.list_tools().await.unwrap_err();
    assert!(matches!(err, McpError::Transport(_)));
    assert_eq!(err.class(), FailureClass::Retryable);
}

#[tokio::test]
async fn test_calls_after_close_fail() {
    let server = mockito::Server::new_async().await;
    let client = client_for(&server);

    client.close().await;

    let err = client
        .call_tool("get_job_templates", Map::new())
        .await
        .unwrap_err();
    assert!(matches!(err, McpError::Closed));
    assert!(matches!(client.list_tools().await, Err(McpError::Closed)));
}

#[tokio::test]
async fn test_malformed_base_url_is_not_retryable() {
    let client = McpHttpClient::new("not a url", Duration::from_secs(1), true).unwrap();

    let err = client.list_tools().await.unwrap_err();
    assert!(matches!(err, McpError::Transport(_)));
    assert_eq!(err.class(), FailureClass::Unclassified);
}

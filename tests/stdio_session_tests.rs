//! Exercises the stdio transport against a scripted fake server (plain `sh`),
//! covering the handshake, tool listing, tool calls, and frame skipping.

#![cfg(unix)]

use mcpchat::config::ToolCommand;
use mcpchat::tool_session::{SessionError, ToolSession};
use mcpchat::tool_sessions::StdioToolSession;

// Replies in request order: initialize (id 1), the initialized notification
// (consumed, no reply), tools/list (id 2, preceded by a notification the client
// must skip), tools/call (id 3).
const FAKE_SERVER: &str = r#"
read line
printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"protocolVersion":"2024-11-05","capabilities":{},"serverInfo":{"name":"fake","version":"0.0.0"}}}'
read line
read line
printf '%s\n' '{"jsonrpc":"2.0","method":"notifications/progress","params":{}}'
printf '%s\n' '{"jsonrpc":"2.0","id":2,"result":{"tools":[{"name":"echo_tool","description":"Echoes its input","inputSchema":{"type":"object"}}]}}'
read line
printf '%s\n' '{"jsonrpc":"2.0","id":3,"result":{"content":[{"type":"text","text":"echoed"}],"isError":false}}'
"#;

fn fake_server_command() -> ToolCommand {
    ToolCommand {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), FAKE_SERVER.to_string()],
    }
}

#[tokio::test]
async fn test_full_session_against_scripted_server() {
    let session = StdioToolSession::spawn(&fake_server_command()).unwrap();

    session.initialize().await.unwrap();

    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].name, "echo_tool");
    assert_eq!(tools[0].description, "Echoes its input");
    assert_eq!(tools[0].input_schema["type"], "object");

    let result = session
        .call_tool("echo_tool", serde_json::json!({"text": "hi"}))
        .await
        .unwrap();
    assert!(!result.is_error);
    assert_eq!(result.content[0]["text"], "echoed");

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_error_response_surfaces_as_protocol_error() {
    let script = r#"
read line
printf '%s\n' '{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"nope"}}'
"#;
    let session = StdioToolSession::spawn(&ToolCommand {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    })
    .unwrap();

    let err = session.initialize().await.unwrap_err();
    match err {
        SessionError::Protocol(msg) => assert!(msg.contains("nope")),
        other => panic!("expected protocol error, got: {}", other),
    }

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_server_exit_reads_as_closed() {
    let session = StdioToolSession::spawn(&ToolCommand {
        command: "true".to_string(),
        args: vec![],
    })
    .unwrap();

    let err = session.initialize().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Closed | SessionError::Transport(_)
    ));

    session.close().await.unwrap();
}

#[tokio::test]
async fn test_spawn_failure() {
    let err = StdioToolSession::spawn(&ToolCommand {
        command: "definitely-not-a-real-binary-mcpchat".to_string(),
        args: vec![],
    })
    .unwrap_err();
    assert!(matches!(err, SessionError::Spawn(_)));
}

#[tokio::test]
async fn test_session_carries_its_spawn_key() {
    let session = StdioToolSession::spawn(&ToolCommand {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), "read line".to_string()],
    })
    .unwrap();
    assert_eq!(session.key(), "sh -c read line");
    session.close().await.unwrap();
}

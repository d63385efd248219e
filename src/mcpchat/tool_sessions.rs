//! Tool Session Implementations
//!
//! This module provides the concrete [`ToolSession`] implementation used in production:
//! a spawned child process speaking newline-delimited JSON-RPC over its stdin/stdout,
//! the stdio transport of the Model Context Protocol.
//!
//! The transport is deliberately thin. Requests are written one per line, responses are
//! read until the answer with the matching id arrives, and server-initiated traffic
//! (notifications, requests the host does not serve) is skipped. There is no timeout:
//! a hung server stalls the host, which is an accepted limitation of the single-task
//! execution model.

use std::process::Stdio;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use crate::config::{SessionKey, ToolCommand};
use crate::tool_session::{SessionError, ToolDescriptor, ToolResult, ToolSession};

/// Protocol revision announced during the handshake.
const PROTOCOL_VERSION: &str = "2024-11-05";

/// A tool session backed by a spawned child process.
///
/// The child inherits the full process environment unmodified and is armed with
/// `kill_on_drop`, so the operating-system resource is reclaimed on every exit
/// path even if [`close`](ToolSession::close) never runs.
///
/// # Example
///
/// ```rust,no_run
/// use mcpchat::config::ToolCommand;
/// use mcpchat::tool_session::ToolSession;
/// use mcpchat::tool_sessions::StdioToolSession;
///
/// # async {
/// let command: ToolCommand = "uvx mcp-server-time".parse().unwrap();
/// let session = StdioToolSession::spawn(&command).unwrap();
/// session.initialize().await.unwrap();
/// let tools = session.list_tools().await.unwrap();
/// println!("{} tools", tools.len());
/// # };
/// ```
#[derive(Debug)]
pub struct StdioToolSession {
    key: SessionKey,
    child: Mutex<Child>,
    pipes: Mutex<Pipes>,
    next_id: AtomicI64,
}

/// The stdin/stdout pair, locked together so one request's write and read cannot
/// interleave with another's.
#[derive(Debug)]
struct Pipes {
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl StdioToolSession {
    /// Spawn the configured command with piped stdio.
    ///
    /// Spawning alone performs no protocol traffic; callers follow up with
    /// [`initialize`](ToolSession::initialize) before anything else.
    pub fn spawn(command: &ToolCommand) -> Result<Self, SessionError> {
        let mut child = Command::new(&command.command)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SessionError::Spawn(format!("{}: {}", command.command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SessionError::Spawn("child stdin was not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SessionError::Spawn("child stdout was not captured".to_string()))?;

        Ok(StdioToolSession {
            key: command.session_key(),
            child: Mutex::new(child),
            pipes: Mutex::new(Pipes {
                stdin,
                stdout: BufReader::new(stdout),
            }),
            next_id: AtomicI64::new(1),
        })
    }

    /// The session key this process was spawned under.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Send one request frame and block until the response with the same id arrives.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, SessionError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let frame = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut pipes = self.pipes.lock().await;
        write_frame(&mut pipes.stdin, &frame).await?;

        loop {
            let mut line = String::new();
            let read = pipes
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| SessionError::Transport(e.to_string()))?;
            if read == 0 {
                return Err(SessionError::Closed);
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let value: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| SessionError::Protocol(format!("unparseable frame: {}", e)))?;

            // Skip anything that is not the answer to this request: notifications
            // and server-initiated requests share the same pipe.
            if value.get("id").and_then(serde_json::Value::as_i64) != Some(id) {
                log::debug!("skipping frame from '{}': {}", self.key, line);
                continue;
            }
            if let Some(error) = value.get("error") {
                return Err(SessionError::Protocol(error.to_string()));
            }
            return Ok(value
                .get("result")
                .cloned()
                .unwrap_or(serde_json::Value::Null));
        }
    }

    /// Send one notification frame (no id, no response expected).
    async fn notify(&self, method: &str, params: serde_json::Value) -> Result<(), SessionError> {
        let frame = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        let mut pipes = self.pipes.lock().await;
        write_frame(&mut pipes.stdin, &frame).await
    }
}

async fn write_frame(
    stdin: &mut ChildStdin,
    frame: &serde_json::Value,
) -> Result<(), SessionError> {
    let mut line = frame.to_string();
    line.push('\n');
    stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|e| SessionError::Transport(e.to_string()))?;
    stdin
        .flush()
        .await
        .map_err(|e| SessionError::Transport(e.to_string()))
}

#[async_trait]
impl ToolSession for StdioToolSession {
    async fn initialize(&self) -> Result<(), SessionError> {
        self.request(
            "initialize",
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
        .await?;
        self.notify("notifications/initialized", serde_json::json!({}))
            .await
    }

    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, SessionError> {
        let result = self.request("tools/list", serde_json::json!({})).await?;
        let tools = result
            .get("tools")
            .cloned()
            .ok_or_else(|| SessionError::Protocol("tools/list result lacks 'tools'".to_string()))?;
        serde_json::from_value(tools)
            .map_err(|e| SessionError::Protocol(format!("malformed tool descriptor: {}", e)))
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, SessionError> {
        let result = self
            .request(
                "tools/call",
                serde_json::json!({"name": name, "arguments": arguments}),
            )
            .await?;
        Ok(ToolResult {
            content: result
                .get("content")
                .cloned()
                .unwrap_or(serde_json::Value::Null),
            is_error: result
                .get("isError")
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
        })
    }

    async fn close(&self) -> Result<(), SessionError> {
        let mut child = self.child.lock().await;
        match child.try_wait() {
            // Server already exited on its own; nothing left to reap.
            Ok(Some(_)) => Ok(()),
            _ => child
                .kill()
                .await
                .map_err(|e| SessionError::Transport(e.to_string())),
        }
    }
}

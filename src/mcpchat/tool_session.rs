//! Tool Session Abstraction Layer
//!
//! This module defines the narrow capability the host consumes from a tool-protocol
//! server: initialize the session, list its tools, call one of them. Anything that can
//! honour those three operations can serve tools to the chat host — a spawned stdio
//! process in production, an in-memory fake in tests.
//!
//! # Architecture
//!
//! ```text
//! CompletionOrchestrator → ToolRouter → SessionRegistry → ToolSession (trait) → [stdio | fake]
//! ```
//!
//! The [`ToolRouter`] also lives here: it is the append-only map from tool name to
//! owning session key, populated once at registration time.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use crate::config::SessionKey;

/// A tool advertised by a session: name, human-readable description, and the JSON
/// schema of its input. The wire field is `inputSchema`; everything downstream uses
/// the snake_case spelling.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default)]
    pub input_schema: serde_json::Value,
}

/// Represents the result of a tool invocation: the structured content payload the
/// session returned, plus its error flag.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The content blocks produced by the tool, kept as raw JSON so they can be fed
    /// back into the conversation unmodified.
    pub content: serde_json::Value,
    /// Whether the session flagged the invocation as failed.
    pub is_error: bool,
}

/// Error types for tool-session operations
#[derive(Debug, Clone)]
pub enum SessionError {
    /// The session process could not be spawned.
    Spawn(String),
    /// Reading from or writing to the session transport failed.
    Transport(String),
    /// The session answered with something the protocol does not allow.
    Protocol(String),
    /// The session ended the conversation (closed pipes, exited process).
    Closed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Spawn(msg) => write!(f, "Failed to spawn session: {}", msg),
            SessionError::Transport(msg) => write!(f, "Session transport error: {}", msg),
            SessionError::Protocol(msg) => write!(f, "Session protocol error: {}", msg),
            SessionError::Closed => write!(f, "Session closed"),
        }
    }
}

impl Error for SessionError {}

/// Trait for a live connection to a tool-protocol server.
///
/// The host performs exactly three operations against a session over its lifetime,
/// plus a final `close`. Implementations are free to cache or not; the registry
/// re-queries `list_tools` live whenever it aggregates catalogues.
#[async_trait]
pub trait ToolSession: Send + Sync {
    /// Perform the protocol handshake. Called once, before any other operation.
    async fn initialize(&self) -> Result<(), SessionError>;

    /// Advertise the tools this session currently exposes.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, SessionError>;

    /// Invoke a named tool with the given JSON arguments.
    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, SessionError>;

    /// Release the session's resources. Called exactly once, at teardown.
    async fn close(&self) -> Result<(), SessionError>;
}

/// Error raised when two sessions expose identically named tools.
///
/// Registration is the only place tool-name uniqueness is checked; a duplicate
/// aborts the remaining connect sequence (see
/// [`SessionRegistry::connect`](crate::SessionRegistry::connect)).
#[derive(Debug, Clone)]
pub struct DuplicateToolError {
    /// The colliding tool name.
    pub name: String,
    /// Key of the session that already owns the name.
    pub owner: SessionKey,
}

impl fmt::Display for DuplicateToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Duplicate tool name: '{}' already registered by session '{}'",
            self.name, self.owner
        )
    }
}

impl Error for DuplicateToolError {}

/// Append-only map from tool name to the key of the session that owns it.
///
/// Populated during session registration and read-only afterwards; there is no
/// unregistration for the process lifetime.
#[derive(Debug, Default)]
pub struct ToolRouter {
    routes: HashMap<String, SessionKey>,
}

impl ToolRouter {
    /// Build an empty router.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Insert a tool-name → session-key mapping.
    ///
    /// Fails with [`DuplicateToolError`] when the name is already routed; the
    /// existing mapping is left untouched.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        session_key: impl Into<SessionKey>,
    ) -> Result<(), DuplicateToolError> {
        let name = name.into();
        if let Some(owner) = self.routes.get(&name) {
            return Err(DuplicateToolError {
                name,
                owner: owner.clone(),
            });
        }
        self.routes.insert(name, session_key.into());
        Ok(())
    }

    /// Look up the session key owning `name`, if any.
    pub fn resolve(&self, name: &str) -> Option<&SessionKey> {
        self.routes.get(name)
    }

    /// Number of routed tool names.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no tool has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut router = ToolRouter::new();
        router.register("get_time", "uvx mcp-server-time").unwrap();

        assert_eq!(
            router.resolve("get_time").map(String::as_str),
            Some("uvx mcp-server-time")
        );
        assert!(router.resolve("unknown").is_none());
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_first_owner() {
        let mut router = ToolRouter::new();
        router.register("get_time", "server-a").unwrap();

        let err = router.register("get_time", "server-b").unwrap_err();
        assert_eq!(err.name, "get_time");
        assert_eq!(err.owner, "server-a");

        // The original mapping survives the rejected insert.
        assert_eq!(router.resolve("get_time").map(String::as_str), Some("server-a"));
    }

    #[test]
    fn test_descriptor_wire_parsing() {
        let raw = serde_json::json!({
            "name": "get_time",
            "description": "Current time in a timezone",
            "inputSchema": {"type": "object", "properties": {"tz": {"type": "string"}}}
        });
        let descriptor: ToolDescriptor = serde_json::from_value(raw).unwrap();
        assert_eq!(descriptor.name, "get_time");
        assert_eq!(descriptor.input_schema["type"], "object");

        // description and inputSchema are optional on the wire
        let minimal: ToolDescriptor = serde_json::from_value(serde_json::json!({"name": "x"})).unwrap();
        assert_eq!(minimal.description, "");
        assert!(minimal.input_schema.is_null());
    }
}

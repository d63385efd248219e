//! # mcpchat
//!
//! mcpchat is an interactive chat host: it drives a cloud LLM completion service that can
//! invoke tools exposed by one or more independently spawned tool-protocol servers, routing
//! each tool invocation to the session that owns it and feeding results back into the
//! conversation.
//!
//! The crate provides carefully layered abstractions for:
//!
//! * **Tool Sessions**: the [`tool_session::ToolSession`] capability trait — `initialize`,
//!   `list_tools`, `call_tool` — with a process-backed stdio implementation
//!   ([`tool_sessions::StdioToolSession`]) and room for custom transports
//! * **Tool Routing**: [`tool_session::ToolRouter`] maps every advertised tool name to the
//!   session that owns it, rejecting cross-session name collisions at registration time
//! * **Session Lifetime**: [`SessionRegistry`] opens sessions in configuration order, owns
//!   them for the process lifetime, aggregates their live tool catalogues, and tears every
//!   one of them down exactly once
//! * **Conversation Windowing**: [`context_window::truncate_to_budget`] keeps the rolling
//!   history inside a fixed length budget using content length as a token proxy
//! * **Turn Orchestration**: [`CompletionOrchestrator`] runs the completion → tool call →
//!   completion resolution cycle for a single user query
//! * **Provider Abstraction**: the [`client_wrapper::ClientWrapper`] trait with an Anthropic
//!   Claude implementation in [`clients::claude`]
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mcpchat::clients::claude::{ClaudeClient, Model};
//! use mcpchat::config::ToolCommand;
//! use mcpchat::{chat_loop, CompletionOrchestrator, SessionRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     mcpchat::init_logger();
//!
//!     let key = std::env::var("ANTHROPIC_KEY")?;
//!     let client = Arc::new(ClaudeClient::new_with_model_enum(&key, Model::ClaudeSonnet45));
//!
//!     let mut registry = SessionRegistry::new();
//!     let command: ToolCommand = "uvx mcp-server-time".parse()?;
//!     registry.connect(&[command]).await?;
//!
//!     let orchestrator = CompletionOrchestrator::new(client);
//!     chat_loop::run_chat_loop(&orchestrator, &registry).await?;
//!
//!     registry.close().await;
//!     Ok(())
//! }
//! ```
//!
//! The interactive surface is line oriented: type a query, read the assistant's reply, type
//! `quit` (or close stdin) to leave. Everything the host knows about a tool server comes from
//! the server itself at connect time; tool catalogues are re-queried live on every turn.

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// The helper is intentionally lightweight so that applications embedding mcpchat can opt-in
/// to simple `RUST_LOG` driven diagnostics without having to choose a specific logging backend
/// upfront.
///
/// ```rust
/// mcpchat::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::init();
    });
}

// Import the top-level `mcpchat` module.
pub mod mcpchat;

// Re-exporting key items for easier external access.
pub use crate::mcpchat::chat_loop;
pub use crate::mcpchat::client_wrapper;
pub use crate::mcpchat::client_wrapper::{
    ClientWrapper, CompletionResponse, ContentBlock, Message, MessageContent, Role,
    ToolDefinition,
};
pub use crate::mcpchat::clients;
pub use crate::mcpchat::config;
pub use crate::mcpchat::config::ToolCommand;
pub use crate::mcpchat::context_window;
pub use crate::mcpchat::orchestrator;
pub use crate::mcpchat::orchestrator::{CompletionOrchestrator, QueryResponse};
pub use crate::mcpchat::session_registry;
pub use crate::mcpchat::session_registry::{SessionRegistry, SetupError};
pub use crate::mcpchat::tool_session;
pub use crate::mcpchat::tool_session::{
    DuplicateToolError, SessionError, ToolDescriptor, ToolResult, ToolRouter, ToolSession,
};
pub use crate::mcpchat::tool_sessions;
pub use crate::mcpchat::tool_sessions::StdioToolSession;

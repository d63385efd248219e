//! Session registry: connection sequencing, ownership, and teardown.
//!
//! The [`SessionRegistry`] is the single owner of every tool session the host opens.
//! It connects sessions in configuration order, registers their tool names into the
//! [`ToolRouter`], aggregates live tool catalogues for the completion prompt, and
//! performs the one teardown pass that releases every opened session exactly once.
//!
//! Presentation order is newest-first: each connected session is inserted logically
//! ahead of previously inserted ones. Only enumeration (catalogue aggregation)
//! depends on that order; keyed lookup is order-independent.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::client_wrapper::{SendError, ToolDefinition};
use crate::config::{SessionKey, ToolCommand};
use crate::tool_session::{DuplicateToolError, SessionError, ToolRouter, ToolSession};
use crate::tool_sessions::StdioToolSession;

/// Failure during the initial connection sequencing, before the interactive loop
/// starts. Fatal: the process aborts after best-effort teardown of whatever was
/// opened. Distinct from per-turn failures, which are reported and survived.
#[derive(Debug)]
pub enum SetupError {
    /// Spawning, initializing, or listing tools of one session failed.
    Session {
        key: SessionKey,
        source: SessionError,
    },
    /// Two sessions exposed identically named tools.
    DuplicateTool(DuplicateToolError),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::Session { key, source } => {
                write!(f, "Failed to set up session '{}': {}", key, source)
            }
            SetupError::DuplicateTool(err) => write!(f, "{}", err),
        }
    }
}

impl Error for SetupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SetupError::Session { source, .. } => Some(source),
            SetupError::DuplicateTool(err) => Some(err),
        }
    }
}

/// One owned session and the key it was opened under.
pub struct SessionEntry {
    pub key: SessionKey,
    pub session: Arc<dyn ToolSession>,
}

/// Owner of every open tool session and of the name → session routing table.
#[derive(Default)]
pub struct SessionRegistry {
    /// Open sessions, newest first.
    entries: Vec<SessionEntry>,
    router: ToolRouter,
}

impl SessionRegistry {
    /// Build an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            router: ToolRouter::new(),
        }
    }

    /// Connect to multiple tool servers, in the given order.
    ///
    /// For each command: spawn the process (environment forwarded unmodified),
    /// perform the handshake, list its tools, and register every tool name with
    /// the router.
    ///
    /// Partial-failure policy: the first error aborts the whole sequence —
    /// subsequent commands are not attempted — but sessions already opened stay
    /// open and present in the registry. They are released by the global
    /// [`close`](SessionRegistry::close) pass, never early.
    pub async fn connect(&mut self, commands: &[ToolCommand]) -> Result<(), SetupError> {
        for command in commands {
            let key = command.session_key();
            let session = StdioToolSession::spawn(command).map_err(|source| {
                SetupError::Session {
                    key: key.clone(),
                    source,
                }
            })?;
            self.attach(key, Arc::new(session)).await?;
        }
        Ok(())
    }

    /// Register an already spawned session under `key`.
    ///
    /// Initializes the session, inserts it ahead of previously attached ones, then
    /// lists and registers its tools. A session whose registration fails remains in
    /// the registry (open) so teardown still reaches it.
    pub async fn attach(
        &mut self,
        key: SessionKey,
        session: Arc<dyn ToolSession>,
    ) -> Result<(), SetupError> {
        session
            .initialize()
            .await
            .map_err(|source| SetupError::Session {
                key: key.clone(),
                source,
            })?;

        // Newest session goes in front. Lookup never depends on this; catalogue
        // aggregation does.
        self.entries.insert(
            0,
            SessionEntry {
                key: key.clone(),
                session: session.clone(),
            },
        );

        let tools = session
            .list_tools()
            .await
            .map_err(|source| SetupError::Session {
                key: key.clone(),
                source,
            })?;

        let mut names = Vec::with_capacity(tools.len());
        for tool in &tools {
            self.router
                .register(tool.name.clone(), key.clone())
                .map_err(SetupError::DuplicateTool)?;
            names.push(tool.name.as_str());
        }

        log::info!("Connected to server '{}' with tools: {:?}", key, names);
        Ok(())
    }

    /// Borrow the routing table.
    pub fn router(&self) -> &ToolRouter {
        &self.router
    }

    /// Keyed lookup of an open session.
    pub fn session(&self, key: &str) -> Option<Arc<dyn ToolSession>> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.session.clone())
    }

    /// Session keys in presentation order (newest first).
    pub fn session_keys(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.key.as_str()).collect()
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no session is connected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate the live tool catalogue across every open session.
    ///
    /// Each session's `list_tools` is re-queried on every call — no caching — and
    /// each description is tagged with its owning session key so the completion
    /// service can tell equally described tools apart.
    pub async fn list_all_tools(&self) -> Result<Vec<ToolDefinition>, SendError> {
        let mut all = Vec::new();
        for entry in &self.entries {
            let tools = entry
                .session
                .list_tools()
                .await
                .map_err(|e| -> SendError { Box::new(e) })?;
            for tool in tools {
                all.push(ToolDefinition {
                    name: tool.name,
                    description: format!("[Server: {}] {}", entry.key, tool.description),
                    input_schema: tool.input_schema,
                });
            }
        }
        Ok(all)
    }

    /// Release every opened session exactly once, regardless of how many connected
    /// successfully. Close errors are logged and swallowed; teardown never fails.
    pub async fn close(&mut self) {
        for entry in self.entries.drain(..) {
            if let Err(err) = entry.session.close().await {
                log::warn!("error closing session '{}': {}", entry.key, err);
            }
        }
    }
}

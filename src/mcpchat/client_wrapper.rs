use async_trait::async_trait;
use std::error::Error;

/// A ClientWrapper is a wrapper around a specific cloud LLM completion service.
/// It provides a common interface to request completions over a message history,
/// optionally advertising a tool catalogue the model may call into.
/// It does not keep track of the conversation; the orchestrator owns the turn's
/// message list and the chat loop owns the running conversation.
// src/mcpchat/client_wrapper.rs

/// Represents the possible roles for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    // a message sent by a human user (or a tool result fed back on the user's behalf)
    Assistant, // lets the model know the content was generated as a response to a user message
}

/// The payload of a [`Message`]: plain text, or the structured content a tool
/// session returned from an invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageContent {
    Text(String),
    ToolResult(serde_json::Value),
}

impl MessageContent {
    /// Length proxy used for conversation-window budgeting.
    ///
    /// This is NOT a token count: text contributes its character length and a
    /// structured tool payload contributes its serialized length. The proxy only
    /// has to be deterministic and roughly monotonic with prompt size.
    pub fn proxy_len(&self) -> usize {
        match self {
            MessageContent::Text(text) => text.len(),
            MessageContent::ToolResult(value) => value.to_string().len(),
        }
    }
}

/// Represents a generic message to be sent to the completion service.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: MessageContent,
}

impl Message {
    /// Plain user text message.
    pub fn user(text: impl Into<String>) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Plain assistant text message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Message {
            role: Role::Assistant,
            content: MessageContent::Text(text.into()),
        }
    }

    /// A tool result fed back into the conversation. Tool results travel with the
    /// user role, mirroring how the completion service expects them.
    pub fn tool_result(content: serde_json::Value) -> Self {
        Message {
            role: Role::User,
            content: MessageContent::ToolResult(content),
        }
    }
}

/// A tool catalogue entry advertised to the completion service.
///
/// The `description` carries the owning session tag (see
/// [`SessionRegistry::list_all_tools`](crate::SessionRegistry::list_all_tools)) so the
/// model can tell apart equally named concepts exposed by different servers.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// One unit of a completion response, in the order the service produced them.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentBlock {
    /// A run of assistant text.
    Text { text: String },
    /// A request to invoke a tool. `text` carries inline assistant commentary when
    /// the service attaches any to the block (most responses leave it empty).
    ToolUse {
        name: String,
        input: serde_json::Value,
        text: Option<String>,
    },
}

/// A full completion response: the ordered content blocks the service returned.
#[derive(Clone, Debug, Default)]
pub struct CompletionResponse {
    pub content: Vec<ContentBlock>,
}

impl CompletionResponse {
    /// The text of the first [`ContentBlock::Text`] block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::ToolUse { .. } => None,
        })
    }
}

/// Type alias for a Send-able error box
pub type SendError = Box<dyn Error + Send + Sync>;

/// Trait defining the interface to interact with a completion service.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// Model identifier reported by this client, for logging and diagnostics.
    fn model_name(&self) -> &str;

    /// Request one completion over `messages`.
    /// - `tools`: catalogue the model may call into; pass `None` to forbid tool
    ///   use for this call.
    /// - `max_output_tokens`: hard output budget forwarded to the service.
    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<Vec<ToolDefinition>>,
        max_output_tokens: u32,
    ) -> Result<CompletionResponse, SendError>;
}

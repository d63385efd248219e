//! Anthropic Claude client wrapper speaking the native Messages API.
//!
//! Use this module when you want the host to complete against Anthropic's Claude models.
//! The wrapper talks to the Messages API directly so that tool-use content blocks come back
//! structured instead of being flattened through an OpenAI-compatible surface.
//!
//! # Example
//!
//! ```rust,no_run
//! use mcpchat::client_wrapper::{ClientWrapper, Message};
//! use mcpchat::clients::claude::{ClaudeClient, Model};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let key = std::env::var("ANTHROPIC_KEY")?;
//!     let client = ClaudeClient::new_with_model_enum(&key, Model::ClaudeSonnet45);
//!     let response = client
//!         .complete(&[Message::user("List three Claude capabilities.")], None, 1000)
//!         .await?;
//!     println!("{:?}", response.first_text());
//!     Ok(())
//! }
//! ```

use crate::client_wrapper::{
    ClientWrapper, CompletionResponse, ContentBlock, Message, MessageContent, Role, SendError,
    ToolDefinition,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client wrapper for Anthropic's Claude Messages API.
pub struct ClaudeClient {
    /// Shared HTTP client for all requests.
    client: reqwest::Client,
    api_key: String,
    /// Exposed model name.
    model: String,
    base_url: String,
}

/// Anthropic Claude models exposed through the wrapper.
pub enum Model {
    /// `claude-sonnet-4-5` – smartest model for complex agents and coding
    ClaudeSonnet45,
    /// `claude-haiku-4-5` – fastest Sonnet 4.5 variant.
    ClaudeHaiku45,
    /// `claude-opus-4-1` – Opus reasoning tier.
    ClaudeOpus41,
    /// `claude-sonnet-4-0` – balanced reasoning + throughput.
    ClaudeSonnet4,
    /// `claude-3-5-sonnet-20241022` – pinned 3.5 Sonnet snapshot.
    ClaudeSonnet35,
    /// `claude-3-5-haiku-latest` – fastest Claude tier.
    ClaudeHaiku35,
}

/// Convert a [`Model`] variant into its public string identifier.
fn model_to_string(model: Model) -> String {
    match model {
        Model::ClaudeSonnet45 => "claude-sonnet-4-5".to_string(),
        Model::ClaudeHaiku45 => "claude-haiku-4-5".to_string(),
        Model::ClaudeOpus41 => "claude-opus-4-1".to_string(),
        Model::ClaudeSonnet4 => "claude-sonnet-4-0".to_string(),
        Model::ClaudeSonnet35 => "claude-3-5-sonnet-20241022".to_string(),
        Model::ClaudeHaiku35 => "claude-3-5-haiku-latest".to_string(),
    }
}

impl ClaudeClient {
    /// Create a client from an API key and strongly typed model variant.
    pub fn new_with_model_enum(secret_key: &str, model: Model) -> Self {
        Self::new_with_model_str(secret_key, &model_to_string(model))
    }

    /// Create a client from an API key and explicit model string.
    pub fn new_with_model_str(secret_key: &str, model_name: &str) -> Self {
        Self::new_with_base_url(secret_key, model_name, ANTHROPIC_BASE_URL)
    }

    /// Create a client pointing at a custom Claude-compatible base URL.
    pub fn new_with_base_url(secret_key: &str, model_name: &str, base_url: &str) -> Self {
        ClaudeClient {
            client: reqwest::Client::new(),
            api_key: secret_key.to_string(),
            model: model_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ClientWrapper for ClaudeClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<Vec<ToolDefinition>>,
        max_output_tokens: u32,
    ) -> Result<CompletionResponse, SendError> {
        let body = ApiRequest {
            model: self.model.clone(),
            max_tokens: max_output_tokens,
            messages: messages.iter().map(to_wire_message).collect(),
            tools,
        };

        log::debug!(
            "claude request: model={} messages={}",
            body.model,
            body.messages.len()
        );

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("Anthropic API error {}: {}", status, error_text).into());
        }

        let parsed: ApiResponse = response.json().await?;
        Ok(CompletionResponse {
            content: parsed
                .content
                .into_iter()
                .filter_map(|block| match block {
                    ApiContentBlock::Text { text } => Some(ContentBlock::Text { text }),
                    ApiContentBlock::ToolUse { name, input, text } => {
                        Some(ContentBlock::ToolUse { name, input, text })
                    }
                    ApiContentBlock::Unknown => None,
                })
                .collect(),
        })
    }
}

/// Render a domain [`Message`] into the wire shape the Messages API expects.
/// Text travels as a JSON string; a tool result travels as the structured block
/// list the tool session produced.
fn to_wire_message(message: &Message) -> WireMessage {
    WireMessage {
        role: match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        },
        content: match &message.content {
            MessageContent::Text(text) => serde_json::Value::String(text.clone()),
            MessageContent::ToolResult(value) => value.clone(),
        },
    }
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDefinition>>,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: serde_json::Value,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ApiContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ApiContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        name: String,
        input: serde_json::Value,
        #[serde(default)]
        text: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

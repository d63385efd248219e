//! Turn orchestration: the completion → tool call → completion resolution cycle.
//!
//! [`CompletionOrchestrator::process_query`] runs one full turn: it truncates the
//! carried-over history, asks the completion service for a response over the live
//! tool catalogue, resolves each tool-use block through the router strictly in
//! response order, and folds tool results back into the turn with one follow-up
//! completion per invocation.
//!
//! Tool resolution is single-level: the follow-up completion is issued without a
//! tool catalogue, so a tool call appearing in a follow-up response is never
//! resolved. Each turn therefore costs at most one extra completion call per
//! tool-use block of the initial response.

use std::sync::Arc;

use crate::client_wrapper::{ClientWrapper, ContentBlock, Message, SendError};
use crate::context_window::truncate_to_budget;
use crate::session_registry::SessionRegistry;

/// Input budget (proxy units) applied to the carried-over history each turn.
pub const MAX_INPUT_TOKENS: usize = 1000;
/// Output-token budget forwarded to the completion service on every call.
pub const MAX_OUTPUT_TOKENS: u32 = 1000;

/// The outcome of one turn: the assistant-visible text plus every message appended
/// during the turn, for the caller to fold into its running conversation.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Final concatenated output text (text blocks, tool status lines, follow-up
    /// answers), joined by newlines.
    pub text: String,
    /// The turn's message list: the user query, any inline assistant text, tool
    /// results, and the final assistant message holding `text`.
    pub messages: Vec<Message>,
}

/// Drives the completion/tool-call resolution cycle for single user queries.
pub struct CompletionOrchestrator {
    client: Arc<dyn ClientWrapper>,
    input_budget: usize,
    output_budget: u32,
}

impl CompletionOrchestrator {
    /// Create an orchestrator with the default input/output budgets.
    pub fn new(client: Arc<dyn ClientWrapper>) -> Self {
        Self {
            client,
            input_budget: MAX_INPUT_TOKENS,
            output_budget: MAX_OUTPUT_TOKENS,
        }
    }

    /// Override the default budgets (builder pattern).
    pub fn with_budgets(mut self, input_budget: usize, output_budget: u32) -> Self {
        self.input_budget = input_budget;
        self.output_budget = output_budget;
        self
    }

    /// Process one query using the completion service and the tools of every
    /// connected session.
    ///
    /// `previous_messages` is the conversation carried over from earlier turns; it
    /// is truncated against the input budget before use and is never mutated. The
    /// returned [`QueryResponse::messages`] holds only the messages this turn
    /// appended — the caller owns their accumulation.
    ///
    /// A tool-use block naming a tool no session registered is skipped silently:
    /// no output line, no message, no error. Processing continues with the next
    /// content block.
    pub async fn process_query(
        &self,
        query: &str,
        previous_messages: &[Message],
        registry: &SessionRegistry,
    ) -> Result<QueryResponse, SendError> {
        let window = truncate_to_budget(previous_messages, self.input_budget);

        let mut turn_messages = vec![Message::user(query)];

        // Collect the live catalogue across all connected servers.
        let available_tools = registry.list_all_tools().await?;

        let response = self
            .client
            .complete(
                &prompt(&window, &turn_messages),
                Some(available_tools),
                self.output_budget,
            )
            .await?;

        let mut final_text: Vec<String> = Vec::new();

        for block in response.content {
            match block {
                ContentBlock::Text { text } => final_text.push(text),
                ContentBlock::ToolUse { name, input, text } => {
                    let session_key = match registry.router().resolve(&name) {
                        Some(key) => key.clone(),
                        None => {
                            log::debug!("no session owns tool '{}', skipping call", name);
                            continue;
                        }
                    };
                    // The router only ever maps to keys the registry inserted, so
                    // this lookup misses only on a programming error.
                    let session = registry.session(&session_key).ok_or_else(|| {
                        format!("router maps '{}' to unknown session '{}'", name, session_key)
                    })?;

                    let result = session.call_tool(&name, input.clone()).await?;
                    final_text.push(format!("[Calling tool {} with args {}]", name, input));

                    if let Some(inline) = text {
                        if !inline.is_empty() {
                            turn_messages.push(Message::assistant(inline));
                        }
                    }
                    turn_messages.push(Message::tool_result(result.content));

                    // Follow-up completion without the catalogue, so the model
                    // cannot chain further tool calls inside this sub-step.
                    let follow_up = self
                        .client
                        .complete(&prompt(&window, &turn_messages), None, self.output_budget)
                        .await?;
                    if let Some(answer) = follow_up.first_text() {
                        final_text.push(answer.to_string());
                    }
                }
            }
        }

        let text = final_text.join("\n");
        turn_messages.push(Message::assistant(text.clone()));

        Ok(QueryResponse {
            text,
            messages: turn_messages,
        })
    }
}

/// The full prompt for one completion call: truncated window, then the turn so far.
fn prompt(window: &[Message], turn: &[Message]) -> Vec<Message> {
    window.iter().chain(turn.iter()).cloned().collect()
}

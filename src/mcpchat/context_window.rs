//! Conversation-window truncation.
//!
//! Before each turn the orchestrator shrinks the carried-over history so the prompt
//! stays inside a fixed input budget. The budget is measured with
//! [`MessageContent::proxy_len`](crate::client_wrapper::MessageContent::proxy_len) —
//! content length standing in for a token count — which keeps the function pure and
//! free of any tokenizer dependency.

use crate::client_wrapper::Message;

/// Take the longest contiguous recent suffix of `messages` whose cumulative proxy
/// length does not exceed `max_budget`.
///
/// Scans from most recent to oldest; the first message (scanning backward) that
/// would overflow the budget, and everything older, is dropped. The returned
/// messages keep their original chronological order. Total: when even the single
/// most recent message overflows, the result is empty.
pub fn truncate_to_budget(messages: &[Message], max_budget: usize) -> Vec<Message> {
    let mut total_length = 0usize;
    let mut kept = 0usize;
    for msg in messages.iter().rev() {
        let new_length = total_length + msg.content.proxy_len();
        if new_length > max_budget {
            break;
        }
        total_length = new_length;
        kept += 1;
    }
    messages[messages.len() - kept..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client_wrapper::Message;

    fn msgs(contents: &[&str]) -> Vec<Message> {
        contents.iter().map(|c| Message::user(*c)).collect()
    }

    #[test]
    fn test_keeps_everything_under_budget() {
        let history = msgs(&["aa", "bb", "cc"]);
        assert_eq!(truncate_to_budget(&history, 6), history);
    }

    #[test]
    fn test_drops_oldest_first_and_preserves_order() {
        let history = msgs(&["old", "mid", "new"]);
        let window = truncate_to_budget(&history, 6);
        assert_eq!(window, msgs(&["mid", "new"]));
    }

    #[test]
    fn test_overflowing_message_cuts_everything_older() {
        // "xxxxx" (5) does not fit after "new" (3) under budget 7; "old" behind it
        // must go too, even though it would fit on its own.
        let history = msgs(&["a", "xxxxx", "new"]);
        let window = truncate_to_budget(&history, 7);
        assert_eq!(window, msgs(&["new"]));
    }

    #[test]
    fn test_newest_message_alone_overflows() {
        let history = msgs(&["short", "a very long recent message"]);
        assert!(truncate_to_budget(&history, 10).is_empty());
    }

    #[test]
    fn test_zero_budget_yields_empty() {
        let history = msgs(&["a"]);
        assert!(truncate_to_budget(&history, 0).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(truncate_to_budget(&[], 100).is_empty());
    }

    #[test]
    fn test_structured_content_counts_serialized_length() {
        let payload = serde_json::json!([{"type": "text", "text": "result"}]);
        let serialized_len = payload.to_string().len();
        let history = vec![Message::user("hi"), Message::tool_result(payload)];

        assert_eq!(truncate_to_budget(&history, serialized_len).len(), 1);
        assert_eq!(truncate_to_budget(&history, serialized_len + 2).len(), 2);
    }
}

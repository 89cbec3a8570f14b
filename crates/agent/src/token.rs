//! Token estimation utilities.
//!
//! Uses a character-based heuristic: ~4 characters per token, accurate
//! within ~10% for BPE tokenizers on English text. The budget comparison
//! only needs a stable, monotone measure — not exact counts.

use annai_core::message::Message;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.len() + 3) / 4
}

/// Estimate the total token cost of a conversation history.
///
/// Measures each message in its `"{role}: {content}"` rendering — the same
/// text the summarizer sees, so the budget and the summary input agree.
pub fn history_tokens(messages: &[Message]) -> usize {
    messages.iter().map(|m| estimate_tokens(&m.render())).sum()
}

//! Context window construction
//!
//! Derives a bounded textual context from the session history to prepend
//! to new inference requests. This is a pure function: the same inputs
//! always produce the same output string.

use crate::session::ChatMessage;

/// Default number of prior messages threaded into a new request
pub const DEFAULT_CONTEXT_TURNS: usize = 3;

/// Fixed framing sentence placed before the rendered history lines
const FRAMING: &str = "Previous conversation for context:";

/// What kind of input the new request carries
///
/// Selects the closing sentence that introduces the new input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTarget {
    /// The new request carries a captured image
    NewImage,
    /// The new request is a typed follow-up query
    NewQuery,
}

impl ContextTarget {
    fn closing_sentence(self) -> &'static str {
        match self {
            Self::NewImage => "Now answer for the new image.",
            Self::NewQuery => "Now answer for the new query.",
        }
    }
}

/// Build the textual context window from prior messages
///
/// Selects the last `max_turns` messages (chronological order preserved)
/// and renders them as `role: content` lines. Messages carrying image
/// data contribute no text and are skipped. Returns the empty string
/// when there is nothing to render, with no framing at all.
///
/// # Examples
///
/// ```
/// use lenstutor::session::{build_context, ChatMessage, ContextTarget};
///
/// let history = vec![ChatMessage::user("What is 2+2?"), ChatMessage::assistant("4")];
/// let context = build_context(&history, 3, ContextTarget::NewQuery);
/// assert!(context.contains("user: What is 2+2?"));
/// assert!(context.contains("assistant: 4"));
/// ```
pub fn build_context(history: &[ChatMessage], max_turns: usize, target: ContextTarget) -> String {
    if history.is_empty() {
        return String::new();
    }

    let window_start = history.len().saturating_sub(max_turns);
    let lines: Vec<String> = history[window_start..]
        .iter()
        .filter(|message| message.image_data.is_none())
        .map(|message| format!("{}: {}", message.role, message.content))
        .collect();

    if lines.is_empty() {
        return String::new();
    }

    format!(
        "{}\n{}\n{}",
        FRAMING,
        lines.join("\n"),
        target.closing_sentence()
    )
}

//! Per-agent conversation sessions
//!
//! History is explicit, per-agent state passed to the engine, not ambient
//! per-provider state. `clear_history` defines the reset semantics.

use super::messages::ChatMessage;

/// Conversation history for a single agent
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    history: Vec<ChatMessage>,
}

impl ChatSession {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::user(content));
    }

    /// Append an assistant turn
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(ChatMessage::assistant(content));
    }

    /// Append an arbitrary message
    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    /// Reset the session
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Full history, oldest first
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// The last `n` turns, oldest first
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Number of turns in the session
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether the session has no turns
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

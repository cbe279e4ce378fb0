//! Conversation log
//!
//! Append-only message history for one in-flight incident resolution.

use crate::core::{Message, ToolResult};

/// Append-only conversation history.
///
/// Owned exclusively by one resolution; messages are never mutated or
/// reordered after insertion. The system prompt is stored separately and
/// rendered first when the log is handed to the model.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
    system_prompt: Option<String>,
}

impl ConversationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty log with a system prompt
    pub fn with_system(prompt: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            system_prompt: Some(prompt.into()),
        }
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append an assistant message
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Append a tool result as a tool message
    pub fn push_tool(&mut self, result: &ToolResult) {
        self.messages.push(result.to_message());
    }

    /// The incident-scoped messages, excluding the system prompt
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Render the full message sequence for a model call
    pub fn to_model_messages(&self) -> Vec<Message> {
        let mut result = Vec::with_capacity(self.messages.len() + 1);

        if let Some(ref prompt) = self.system_prompt {
            result.push(Message::system(prompt.clone()));
        }

        result.extend(self.messages.iter().cloned());
        result
    }

    /// Consume the log, returning the incident-scoped messages
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Get message count, excluding the system prompt
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

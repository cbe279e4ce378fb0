//! Model provider trait for abstracting the chat backend
//!
//! The orchestrator only sees this seam, so tests can substitute a
//! scripted fake for the real Ollama client.

use async_trait::async_trait;

use crate::core::{Message, Result};

/// Response-format hint passed along with a completion request.
///
/// `Json` asks the backend to constrain output to a JSON object where the
/// backend supports it; `Text` and `None` leave the output free-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    /// Constrain output to JSON
    Json,
    /// Plain text expected
    Text,
    /// No preference
    None,
}

/// Trait for model collaborators
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate a completion for the conversation so far
    async fn complete(&self, messages: &[Message], format: FormatHint) -> Result<String>;

    /// Verify the backend is reachable and the configured model is present
    async fn check_ready(&self) -> Result<()>;

    /// Get the provider name
    fn name(&self) -> &str;
}

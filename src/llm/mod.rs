//! LLM module - model collaborator integrations
//!
//! Provides the model provider abstraction with Ollama as the backend.

pub mod ollama;
pub mod traits;

pub use ollama::OllamaModel;
pub use traits::{FormatHint, ModelProvider};

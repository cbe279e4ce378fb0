//! Custom error types for Aegis
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Aegis operations
#[derive(Error, Debug)]
pub enum AegisError {
    /// Model collaborator connection or API errors
    #[error("Model error: {0}")]
    Model(String),

    /// Tool dispatch errors
    #[error("Tool error: {0}")]
    Tool(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Model not available
    #[error("Model '{0}' not available in Ollama. Run: ollama pull {0}")]
    ModelNotFound(String),

    /// A tool argument that must be a numeric identifier could not be coerced
    #[error("Argument '{field}' is not a numeric identifier: {value}")]
    ArgumentCoercion { field: String, value: String },

    /// The expectation policy has no transition for the loop's current state
    #[error("Unexpected state: no transition for turn {turn} after tool '{last_tool}'")]
    UnmappedState { turn: usize, last_tool: String },

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for Aegis operations
pub type Result<T> = std::result::Result<T, AegisError>;

impl AegisError {
    /// Create a model collaborator error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a tool dispatch error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::Tool(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a coercion error naming the offending field and value
    pub fn coercion(field: impl Into<String>, value: &serde_json::Value) -> Self {
        Self::ArgumentCoercion {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

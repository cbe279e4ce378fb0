//! Shared types used across Aegis modules
//!
//! Contains the incident, message, tool call/result, and outcome types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A payment-failure event to resolve.
///
/// `user_id` and `order_id` are derived from `raw_payload` on construction
/// by a best-effort parse; a payload that is not valid JSON leaves both
/// absent without failing. The incident never changes after construction.
#[derive(Debug, Clone)]
pub struct Incident {
    /// Event type as delivered by the intake layer (e.g. "payment_failed")
    pub event_type: String,
    /// The full event JSON, kept opaque
    pub raw_payload: String,
    /// User identifier extracted from the payload, if present
    pub user_id: Option<i64>,
    /// Order identifier extracted from the payload, if present
    pub order_id: Option<i64>,
}

impl Incident {
    /// Create an incident, deriving identifier fields from the payload
    pub fn new(event_type: impl Into<String>, raw_payload: impl Into<String>) -> Self {
        let raw_payload = raw_payload.into();
        let parsed: Option<Value> = serde_json::from_str(&raw_payload).ok();

        let field = |key: &str| -> Option<i64> {
            parsed.as_ref().and_then(|v| v.get(key)).and_then(Value::as_i64)
        };

        Self {
            event_type: event_type.into(),
            user_id: field("user_id"),
            order_id: field("order_id"),
            raw_payload,
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, tool, system)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    /// Create a new tool message
    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub args: Map<String, Value>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, args: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Get a string argument by key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }

    /// Get an integer argument by key
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.args.get(key).and_then(Value::as_i64)
    }
}

/// Normalized outcome of a tool invocation.
///
/// The payload is either the collaborator's domain mapping or a one-key
/// `{"error": ...}` mapping; dispatch always produces a value.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Name of the tool that was dispatched
    pub tool_name: String,
    /// The normalized JSON payload
    pub payload: Value,
}

impl ToolResult {
    /// Create a successful result carrying the collaborator's payload
    pub fn ok(tool_name: impl Into<String>, payload: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            payload,
        }
    }

    /// Create a failed result with an error description
    pub fn error(tool_name: impl Into<String>, error: impl Into<String>) -> Self {
        let message: String = error.into();
        Self {
            tool_name: tool_name.into(),
            payload: serde_json::json!({ "error": message }),
        }
    }

    /// Whether the payload is an error mapping
    pub fn is_error(&self) -> bool {
        self.payload.get("error").is_some()
    }

    /// Render the payload as a `tool` message for the conversation log
    pub fn to_message(&self) -> Message {
        Message::tool(self.payload.to_string())
    }
}

/// Terminal status of an incident resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// A plan was produced without running the tool loop
    Acknowledged,
    /// The loop reached a final answer
    Completed,
    /// The resolution failed; the summary explains where
    Error,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Acknowledged => write!(f, "ACKNOWLEDGED"),
            OutcomeStatus::Completed => write!(f, "COMPLETED"),
            OutcomeStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// The loop's sole externally visible result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutcome {
    /// Terminal status
    pub status: OutcomeStatus,
    /// Human-readable summary; for ERROR it names the failure point
    pub summary: String,
}

impl AgentOutcome {
    /// Create an acknowledged outcome carrying the model's plan
    pub fn acknowledged(summary: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Acknowledged,
            summary: summary.into(),
        }
    }

    /// Create a completed outcome carrying the final answer
    pub fn completed(summary: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Completed,
            summary: summary.into(),
        }
    }

    /// Create an error outcome with a diagnostic summary
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            summary: summary.into(),
        }
    }
}

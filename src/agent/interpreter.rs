//! Response interpreter
//!
//! Classifies raw model output as a structured tool call or a final answer,
//! recovering from ambiguous formatting.

use serde_json::Value;

use crate::agent::policy::FormatExpectation;
use crate::core::ToolCall;

/// Classification of one raw model response
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// A recognized tool-call envelope
    ToolCall(ToolCall),
    /// The model's final answer, verbatim
    FinalAnswer(String),
    /// The turn required JSON and the output was not parseable
    FormatError(String),
}

/// Classify raw model output against the turn's format expectation.
///
/// A tool-call envelope (`{"tool_name": ..., "tool_args": {...}}`) is
/// honored regardless of the expectation, so a model that volunteers a tool
/// call on a text-only turn is not rejected. JSON that parses but lacks the
/// envelope shape is a final answer, verbatim. Unparseable text is only an
/// error when the turn required JSON.
pub fn interpret(raw: &str, expectation: FormatExpectation) -> Interpretation {
    let trimmed = raw.trim();

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => {
            if let Some(call) = tool_call_envelope(&value) {
                return Interpretation::ToolCall(call);
            }
            Interpretation::FinalAnswer(raw.to_string())
        }
        Err(e) => {
            if expectation == FormatExpectation::RequireJson {
                Interpretation::FormatError(format!(
                    "expected a JSON tool call but the output was not parseable ({})",
                    e
                ))
            } else {
                Interpretation::FinalAnswer(raw.to_string())
            }
        }
    }
}

/// Extract a tool call when the parsed value has the envelope shape:
/// a string `tool_name` field and a mapping `tool_args` field.
fn tool_call_envelope(value: &Value) -> Option<ToolCall> {
    let object = value.as_object()?;
    let name = object.get("tool_name")?.as_str()?;
    let args = object.get("tool_args")?.as_object()?;
    Some(ToolCall::new(name, args.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE: &str =
        r#"{"tool_name": "get_payment_methods", "tool_args": {"user_id": 42}}"#;

    #[test]
    fn test_envelope_is_a_tool_call() {
        let result = interpret(ENVELOPE, FormatExpectation::RequireJson);
        match result {
            Interpretation::ToolCall(call) => {
                assert_eq!(call.name, "get_payment_methods");
                assert_eq!(call.get_i64("user_id"), Some(42));
            }
            other => panic!("expected tool call, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_accepted_even_when_text_required() {
        // Pins the lenient half of the asymmetry: a volunteered tool call
        // wins over a text-only expectation.
        let result = interpret(ENVELOPE, FormatExpectation::RequireText);
        assert!(matches!(result, Interpretation::ToolCall(_)));
    }

    #[test]
    fn test_json_without_envelope_is_final_answer_verbatim() {
        let raw = r#"{"verdict": "resolved", "note": "retry succeeded"}"#;
        let result = interpret(raw, FormatExpectation::RequireJson);
        assert_eq!(result, Interpretation::FinalAnswer(raw.to_string()));
    }

    #[test]
    fn test_prose_on_json_turn_is_a_format_error() {
        // Pins the strict half of the asymmetry.
        let result = interpret(
            "I think we should check the payment methods first.",
            FormatExpectation::RequireJson,
        );
        assert!(matches!(result, Interpretation::FormatError(_)));
    }

    #[test]
    fn test_prose_is_final_answer_when_either_allowed() {
        let raw = "Retry succeeded; the order is paid.";
        let result = interpret(raw, FormatExpectation::AllowEither);
        assert_eq!(result, Interpretation::FinalAnswer(raw.to_string()));
    }

    #[test]
    fn test_prose_is_final_answer_when_text_required() {
        let raw = "Escalated to human review under ticket esc-7-1234.";
        let result = interpret(raw, FormatExpectation::RequireText);
        assert_eq!(result, Interpretation::FinalAnswer(raw.to_string()));
    }

    #[test]
    fn test_non_string_tool_name_is_not_an_envelope() {
        let raw = r#"{"tool_name": 3, "tool_args": {}}"#;
        let result = interpret(raw, FormatExpectation::RequireJson);
        assert!(matches!(result, Interpretation::FinalAnswer(_)));
    }

    #[test]
    fn test_non_mapping_tool_args_is_not_an_envelope() {
        let raw = r#"{"tool_name": "retry_payment", "tool_args": [1, 2]}"#;
        let result = interpret(raw, FormatExpectation::RequireJson);
        assert!(matches!(result, Interpretation::FinalAnswer(_)));
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        let raw = format!("\n  {}\n", ENVELOPE);
        let result = interpret(&raw, FormatExpectation::RequireJson);
        assert!(matches!(result, Interpretation::ToolCall(_)));
    }
}

//! Expectation policy
//!
//! Data-driven transition table mapping (turn, previously planned tool) to
//! the next prompt and the response shape required of the model. Rows are
//! table entries so new tools and turns are additive.

use crate::core::{AegisError, Incident, Result};
use crate::llm::FormatHint;

/// Response shape required of the model on a given turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatExpectation {
    /// The output must be a JSON tool call
    RequireJson,
    /// A tool call or a final text answer are both acceptable
    AllowEither,
    /// Only a final text answer is acceptable
    RequireText,
}

impl FormatExpectation {
    /// The format hint forwarded to the model collaborator
    pub fn hint(self) -> FormatHint {
        match self {
            FormatExpectation::RequireJson => FormatHint::Json,
            FormatExpectation::RequireText => FormatHint::Text,
            FormatExpectation::AllowEither => FormatHint::None,
        }
    }
}

/// What to ask the model on one turn
#[derive(Debug, Clone)]
pub struct TurnPlan {
    /// The rendered user prompt
    pub prompt: String,
    /// The response shape the interpreter will hold the model to
    pub expectation: FormatExpectation,
}

/// One row of the transition table
struct Transition {
    /// The tool planned on the previous turn; `None` is the opening row
    after_tool: Option<&'static str>,
    expectation: FormatExpectation,
    render: fn(&Incident) -> String,
}

const ENVELOPE: &str = r#"Respond with a single JSON object of the form {"tool_name": "<tool>", "tool_args": {...}} and nothing else."#;

const TRANSITIONS: &[Transition] = &[
    Transition {
        after_tool: None,
        expectation: FormatExpectation::RequireJson,
        render: opening_prompt,
    },
    Transition {
        after_tool: Some("get_payment_methods"),
        expectation: FormatExpectation::RequireJson,
        render: after_payment_methods,
    },
    Transition {
        after_tool: Some("retry_payment"),
        expectation: FormatExpectation::AllowEither,
        render: after_retry,
    },
    Transition {
        after_tool: Some("query_knowledge_base"),
        expectation: FormatExpectation::RequireJson,
        render: after_knowledge_base,
    },
    Transition {
        after_tool: Some("escalate_to_human"),
        expectation: FormatExpectation::RequireText,
        render: after_escalation,
    },
];

fn opening_prompt(incident: &Incident) -> String {
    format!(
        "A critical payment incident has been received.\n\
         - Event type: {}\n\
         - Full event JSON: {}\n\n\
         Your first step is to inspect the customer's payment methods on \
         file. Call the get_payment_methods tool. {}",
        incident.event_type, incident.raw_payload, ENVELOPE
    )
}

fn after_payment_methods(_incident: &Incident) -> String {
    format!(
        "The get_payment_methods result is recorded above. If any method has \
         status \"active\", call retry_payment with that payment_method_id. \
         If no method is active, call query_knowledge_base with a short \
         description of the failed payment. {}",
        ENVELOPE
    )
}

fn after_retry(_incident: &Incident) -> String {
    format!(
        "The retry_payment result is recorded above. If the retry succeeded, \
         reply with a short plain-text summary of how the incident was \
         resolved. If it failed, call query_knowledge_base with a short \
         description of the failed payment. For a tool call, {}",
        ENVELOPE
    )
}

fn after_knowledge_base(_incident: &Incident) -> String {
    format!(
        "The policy lookup result is recorded above. Automated recovery is \
         exhausted; apply the policy by calling escalate_to_human with a \
         reason summarizing the failure. {}",
        ENVELOPE
    )
}

fn after_escalation(_incident: &Incident) -> String {
    "The escalation result is recorded above. Reply with a short plain-text \
     summary of the incident and the actions taken. Do not call any more \
     tools."
        .to_string()
}

/// The expectation policy over the transition table
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectationPolicy;

impl ExpectationPolicy {
    /// Look up the prompt and format expectation for the next turn.
    ///
    /// The opening row only applies on turn 1; any state the table does not
    /// map is a fatal loop error rather than a reason to keep looping.
    pub fn plan_turn(
        &self,
        turn_index: usize,
        last_tool: Option<&str>,
        incident: &Incident,
    ) -> Result<TurnPlan> {
        if last_tool.is_none() && turn_index != 1 {
            return Err(AegisError::UnmappedState {
                turn: turn_index,
                last_tool: "none".to_string(),
            });
        }

        let transition = TRANSITIONS
            .iter()
            .find(|t| t.after_tool == last_tool)
            .ok_or_else(|| AegisError::UnmappedState {
                turn: turn_index,
                last_tool: last_tool.unwrap_or("none").to_string(),
            })?;

        Ok(TurnPlan {
            prompt: (transition.render)(incident),
            expectation: transition.expectation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incident() -> Incident {
        Incident::new("payment_failed", r#"{"user_id": 42, "order_id": 7}"#)
    }

    #[test]
    fn test_opening_turn_requires_json() {
        let plan = ExpectationPolicy.plan_turn(1, None, &incident()).unwrap();
        assert_eq!(plan.expectation, FormatExpectation::RequireJson);
        assert!(plan.prompt.contains("payment_failed"));
        assert!(plan.prompt.contains("get_payment_methods"));
    }

    #[test]
    fn test_expectations_per_previous_tool() {
        let policy = ExpectationPolicy;
        let incident = incident();

        let cases = [
            ("get_payment_methods", FormatExpectation::RequireJson),
            ("retry_payment", FormatExpectation::AllowEither),
            ("query_knowledge_base", FormatExpectation::RequireJson),
            ("escalate_to_human", FormatExpectation::RequireText),
        ];

        for (tool, expected) in cases {
            let plan = policy.plan_turn(2, Some(tool), &incident).unwrap();
            assert_eq!(plan.expectation, expected, "after {}", tool);
        }
    }

    #[test]
    fn test_branch_prompts_name_their_tools() {
        let policy = ExpectationPolicy;
        let incident = incident();

        let plan = policy.plan_turn(2, Some("get_payment_methods"), &incident).unwrap();
        assert!(plan.prompt.contains("retry_payment"));
        assert!(plan.prompt.contains("query_knowledge_base"));

        let plan = policy.plan_turn(3, Some("query_knowledge_base"), &incident).unwrap();
        assert!(plan.prompt.contains("escalate_to_human"));

        let plan = policy.plan_turn(4, Some("escalate_to_human"), &incident).unwrap();
        assert!(plan.prompt.contains("plain-text summary"));
    }

    #[test]
    fn test_unmapped_tool_is_fatal() {
        let err = ExpectationPolicy
            .plan_turn(3, Some("browse_web"), &incident())
            .unwrap_err();
        assert!(matches!(err, AegisError::UnmappedState { .. }));
    }

    #[test]
    fn test_opening_row_only_applies_on_turn_one() {
        let err = ExpectationPolicy.plan_turn(2, None, &incident()).unwrap_err();
        assert!(matches!(err, AegisError::UnmappedState { turn: 2, .. }));
    }
}

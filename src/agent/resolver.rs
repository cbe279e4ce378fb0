//! Incident resolver
//!
//! The orchestrator loop: asks the expectation policy what to say, invokes
//! the model, interprets the response, dispatches tool calls, and maps every
//! exit path onto exactly one outcome.

use std::sync::Arc;

use crate::agent::conversation::ConversationLog;
use crate::agent::interpreter::{interpret, Interpretation};
use crate::agent::policy::ExpectationPolicy;
use crate::core::config::AgentConfig;
use crate::core::{AgentOutcome, Incident, Message, Result};
use crate::llm::{FormatHint, ModelProvider};
use crate::tools::ToolRegistry;

const DEFAULT_SYSTEM_PROMPT: &str = "You are 'Aegis', an autonomous incident resolution \
     agent for payment failures. You investigate with the tools offered in each \
     instruction and keep every answer brief.";

/// Outcome of one incident resolution together with its transcript.
///
/// The transcript is returned by value; nothing about a finished resolution
/// is shared or retained.
#[derive(Debug)]
pub struct Resolution {
    /// The externally visible result
    pub outcome: AgentOutcome,
    /// The full conversation, excluding the system prompt
    pub transcript: Vec<Message>,
}

/// Drives incident resolutions against injected collaborators
pub struct Resolver {
    /// `None` when the model client never initialized at startup
    model: Option<Arc<dyn ModelProvider>>,
    tools: ToolRegistry,
    policy: ExpectationPolicy,
    max_turns: usize,
    system_prompt: String,
}

impl Resolver {
    /// Create a resolver over the given collaborators
    pub fn new(
        model: Option<Arc<dyn ModelProvider>>,
        tools: ToolRegistry,
        config: &AgentConfig,
    ) -> Self {
        Self {
            model,
            tools,
            policy: ExpectationPolicy,
            max_turns: config.max_turns,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }

    /// Resolve one incident to a terminal outcome.
    ///
    /// Every code path yields a well-formed outcome; an uninitialized model
    /// client fails the incident immediately, before any turn runs.
    pub async fn resolve(&self, incident: &Incident) -> Resolution {
        let Some(model) = &self.model else {
            return Self::model_unavailable();
        };

        tracing::info!(event_type = %incident.event_type, "resolving incident");

        let mut log = ConversationLog::with_system(&self.system_prompt);
        let outcome = match self.run_loop(model.as_ref(), incident, &mut log).await {
            Ok(outcome) => outcome,
            Err(e) => AgentOutcome::error(format!("Incident resolution failed: {}", e)),
        };

        tracing::info!(status = %outcome.status, "incident finished");

        Resolution {
            outcome,
            transcript: log.into_messages(),
        }
    }

    async fn run_loop(
        &self,
        model: &dyn ModelProvider,
        incident: &Incident,
        log: &mut ConversationLog,
    ) -> Result<AgentOutcome> {
        let mut last_tool_planned: Option<String> = None;

        for turn_index in 1..=self.max_turns {
            let plan =
                self.policy
                    .plan_turn(turn_index, last_tool_planned.as_deref(), incident)?;

            tracing::info!(turn = turn_index, expectation = ?plan.expectation, "starting turn");
            log.push_user(&plan.prompt);

            let raw = match model
                .complete(&log.to_model_messages(), plan.expectation.hint())
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    return Ok(AgentOutcome::error(format!(
                        "Model invocation failed on turn {}: {}",
                        turn_index, e
                    )))
                }
            };
            tracing::debug!(turn = turn_index, output = %raw, "model responded");
            log.push_assistant(&raw);

            match interpret(&raw, plan.expectation) {
                Interpretation::FinalAnswer(text) => {
                    tracing::info!(turn = turn_index, "final answer produced");
                    return Ok(AgentOutcome::completed(text));
                }
                Interpretation::FormatError(reason) => {
                    return Ok(AgentOutcome::error(format!(
                        "Format mismatch on turn {}: {}",
                        turn_index, reason
                    )));
                }
                Interpretation::ToolCall(call) => {
                    tracing::info!(turn = turn_index, tool = %call.name, "dispatching tool call");
                    let result = self.tools.dispatch(&call, incident).await?;
                    if result.is_error() {
                        tracing::warn!(turn = turn_index, tool = %call.name, payload = %result.payload,
                            "tool returned an error payload");
                    }
                    log.push_tool(&result);
                    last_tool_planned = Some(call.name);
                }
            }
        }

        Ok(AgentOutcome::error("max turns exceeded"))
    }

    /// Answer an incident with an investigation plan only, skipping the tool
    /// loop. The sole producer of the ACKNOWLEDGED status.
    pub async fn acknowledge(&self, incident: &Incident) -> Resolution {
        let Some(model) = &self.model else {
            return Self::model_unavailable();
        };

        let mut log = ConversationLog::with_system(&self.system_prompt);
        log.push_user(plan_prompt(incident));

        let outcome = match model.complete(&log.to_model_messages(), FormatHint::Text).await {
            Ok(plan) => {
                log.push_assistant(&plan);
                AgentOutcome::acknowledged(plan.trim().to_string())
            }
            Err(e) => AgentOutcome::error(format!("Error during model processing: {}", e)),
        };

        Resolution {
            outcome,
            transcript: log.into_messages(),
        }
    }

    fn model_unavailable() -> Resolution {
        Resolution {
            outcome: AgentOutcome::error(
                "Model client not initialized. Check the Ollama connection.",
            ),
            transcript: Vec::new(),
        }
    }
}

fn plan_prompt(incident: &Incident) -> String {
    format!(
        "A critical incident has been received.\n\
         - Event type: {}\n\
         - Full event JSON: {}\n\n\
         Your goal is a brief, one-sentence summary of your immediate plan. \
         What is the first logical step you will take to investigate this?",
        incident.event_type, incident.raw_payload
    )
}

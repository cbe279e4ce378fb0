//! Tool registry - declares capabilities and dispatches tool calls
//!
//! Each capability is a declared record (name, required arguments, identifier
//! coercion, backfill rules) dispatched by exact-match lookup. The dispatcher
//! never lets a collaborator failure escape as anything other than an error
//! payload; the only typed error it returns is identifier coercion, which the
//! loop treats as fatal.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::core::{AegisError, Incident, Result, ToolCall, ToolResult};
use crate::tools::escalation::EscalationApi;
use crate::tools::knowledge::PolicySearch;
use crate::tools::payment::PaymentApi;

/// Incident field a capability may backfill an argument from
#[derive(Debug, Clone, Copy)]
enum BackfillSource {
    UserId,
    OrderId,
}

/// Declared shape of one tool capability
struct Capability {
    name: &'static str,
    /// Argument keys that must be present after backfill
    required: &'static [&'static str],
    /// Argument keys coerced to integer identifiers
    numeric: &'static [&'static str],
    /// (key, incident field) pairs inserted when the model omits the key
    backfill: &'static [(&'static str, BackfillSource)],
}

/// The supported capabilities, in dispatch order
const CAPABILITIES: &[Capability] = &[
    Capability {
        name: "get_payment_methods",
        required: &["user_id"],
        numeric: &["user_id"],
        backfill: &[("user_id", BackfillSource::UserId)],
    },
    Capability {
        name: "retry_payment",
        required: &["order_id", "payment_method_id"],
        numeric: &["order_id"],
        backfill: &[("order_id", BackfillSource::OrderId)],
    },
    Capability {
        name: "query_knowledge_base",
        required: &["query"],
        numeric: &[],
        backfill: &[],
    },
    Capability {
        name: "escalate_to_human",
        required: &["order_id", "reason"],
        numeric: &["order_id"],
        backfill: &[("order_id", BackfillSource::OrderId)],
    },
];

/// Registry of available tools and their collaborators
pub struct ToolRegistry {
    payment: Arc<dyn PaymentApi>,
    /// Absent when the search cluster never connected at startup
    search: Option<Arc<dyn PolicySearch>>,
    escalation: Arc<dyn EscalationApi>,
}

impl ToolRegistry {
    /// Create a registry over the given collaborators
    pub fn new(
        payment: Arc<dyn PaymentApi>,
        search: Option<Arc<dyn PolicySearch>>,
        escalation: Arc<dyn EscalationApi>,
    ) -> Self {
        Self {
            payment,
            search,
            escalation,
        }
    }

    /// Whether a tool name is a declared capability
    pub fn is_known(name: &str) -> bool {
        CAPABILITIES.iter().any(|c| c.name == name)
    }

    /// Dispatch a tool call against its collaborator.
    ///
    /// Unknown names, missing arguments, and collaborator failures are
    /// normalized into `{"error": ...}` results. An identifier that cannot
    /// be coerced to an integer is returned as a typed error.
    pub async fn dispatch(&self, call: &ToolCall, incident: &Incident) -> Result<ToolResult> {
        let Some(capability) = CAPABILITIES.iter().find(|c| c.name == call.name) else {
            tracing::warn!(tool = %call.name, "model requested an unknown tool");
            return Ok(ToolResult::error(&call.name, "tool not recognized"));
        };

        let mut args = call.args.clone();

        // Backfill only keys the model omitted; model-supplied values win.
        for (key, source) in capability.backfill {
            let absent = args.get(*key).map(Value::is_null).unwrap_or(true);
            if absent {
                let derived = match source {
                    BackfillSource::UserId => incident.user_id,
                    BackfillSource::OrderId => incident.order_id,
                };
                if let Some(id) = derived {
                    args.insert((*key).to_string(), Value::from(id));
                }
            }
        }

        // Identifier fields accept JSON numbers or numeric strings.
        for key in capability.numeric {
            if let Some(value) = args.get(*key) {
                let coerced = match value {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                };
                match coerced {
                    Some(id) => {
                        args.insert((*key).to_string(), Value::from(id));
                    }
                    None => return Err(AegisError::coercion(*key, value)),
                }
            }
        }

        for key in capability.required {
            let absent = args.get(*key).map(Value::is_null).unwrap_or(true);
            if absent {
                return Ok(ToolResult::error(
                    capability.name,
                    format!("missing required argument '{}'", key),
                ));
            }
        }

        match self.invoke(capability.name, &args).await {
            Ok(payload) => Ok(ToolResult::ok(capability.name, payload)),
            Err(e) => {
                tracing::warn!(tool = capability.name, error = %e, "tool invocation failed");
                Ok(ToolResult::error(capability.name, e.to_string()))
            }
        }
    }

    async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<Value> {
        match name {
            "get_payment_methods" => {
                let user_id = args.get("user_id").and_then(Value::as_i64).unwrap_or_default();
                self.payment.get_payment_methods(user_id).await
            }
            "retry_payment" => {
                let order_id = args.get("order_id").and_then(Value::as_i64).unwrap_or_default();
                let method = args
                    .get("payment_method_id")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                self.payment.retry_payment(order_id, method).await
            }
            "query_knowledge_base" => {
                let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
                match &self.search {
                    Some(search) => search.query(query).await,
                    None => Ok(json!({ "error": "unavailable" })),
                }
            }
            "escalate_to_human" => {
                let order_id = args.get("order_id").and_then(Value::as_i64).unwrap_or_default();
                let reason = args.get("reason").and_then(Value::as_str).unwrap_or_default();
                self.escalation.escalate(order_id, reason).await
            }
            _ => Err(AegisError::tool("tool not recognized")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records invocations; returns canned payloads
    #[derive(Default)]
    struct RecordingPayment {
        calls: Mutex<Vec<(String, Value)>>,
        fail: bool,
    }

    #[async_trait]
    impl PaymentApi for RecordingPayment {
        async fn get_payment_methods(&self, user_id: i64) -> Result<Value> {
            self.calls
                .lock()
                .unwrap()
                .push(("get_payment_methods".to_string(), json!({ "user_id": user_id })));
            if self.fail {
                return Err(AegisError::tool("connection refused"));
            }
            Ok(json!({ "payment_methods": [] }))
        }

        async fn retry_payment(&self, order_id: i64, payment_method_id: &str) -> Result<Value> {
            self.calls.lock().unwrap().push((
                "retry_payment".to_string(),
                json!({ "order_id": order_id, "payment_method_id": payment_method_id }),
            ));
            Ok(json!({ "status": "success" }))
        }
    }

    struct StubEscalation;

    #[async_trait]
    impl EscalationApi for StubEscalation {
        async fn escalate(&self, order_id: i64, _reason: &str) -> Result<Value> {
            Ok(json!({ "ticket_id": format!("esc-{}-0", order_id), "status": "queued" }))
        }
    }

    fn incident() -> Incident {
        Incident::new("payment_failed", r#"{"user_id": 42, "order_id": 7}"#)
    }

    fn registry(payment: Arc<RecordingPayment>) -> ToolRegistry {
        ToolRegistry::new(payment, None, Arc::new(StubEscalation))
    }

    fn call(name: &str, args: Value) -> ToolCall {
        let Value::Object(map) = args else { panic!("args must be an object") };
        ToolCall::new(name, map)
    }

    #[tokio::test]
    async fn test_unknown_tool_never_contacts_collaborator() {
        let payment = Arc::new(RecordingPayment::default());
        let registry = registry(payment.clone());

        let result = registry
            .dispatch(&call("delete_database", json!({})), &incident())
            .await
            .unwrap();

        assert_eq!(result.payload, json!({ "error": "tool not recognized" }));
        assert!(payment.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_backfill_supplies_omitted_user_id() {
        let payment = Arc::new(RecordingPayment::default());
        let registry = registry(payment.clone());

        registry
            .dispatch(&call("get_payment_methods", json!({})), &incident())
            .await
            .unwrap();

        let calls = payment.calls.lock().unwrap();
        assert_eq!(calls[0].1["user_id"], 42);
    }

    #[tokio::test]
    async fn test_backfill_never_overwrites_model_values() {
        let payment = Arc::new(RecordingPayment::default());
        let registry = registry(payment.clone());
        let tool_call = call("get_payment_methods", json!({ "user_id": 99 }));

        registry.dispatch(&tool_call, &incident()).await.unwrap();
        registry.dispatch(&tool_call, &incident()).await.unwrap();

        let calls = payment.calls.lock().unwrap();
        assert_eq!(calls[0].1["user_id"], 99);
        assert_eq!(calls[1].1["user_id"], 99);
    }

    #[tokio::test]
    async fn test_numeric_string_identifier_is_coerced() {
        let payment = Arc::new(RecordingPayment::default());
        let registry = registry(payment.clone());

        registry
            .dispatch(
                &call(
                    "retry_payment",
                    json!({ "order_id": "7", "payment_method_id": "card_B_paypal" }),
                ),
                &incident(),
            )
            .await
            .unwrap();

        let calls = payment.calls.lock().unwrap();
        assert_eq!(calls[0].1["order_id"], 7);
    }

    #[tokio::test]
    async fn test_non_numeric_identifier_is_a_typed_error() {
        let payment = Arc::new(RecordingPayment::default());
        let registry = registry(payment.clone());

        let err = registry
            .dispatch(
                &call("get_payment_methods", json!({ "user_id": "forty-two" })),
                &incident(),
            )
            .await
            .unwrap_err();

        match err {
            AegisError::ArgumentCoercion { field, value } => {
                assert_eq!(field, "user_id");
                assert!(value.contains("forty-two"));
            }
            other => panic!("expected coercion error, got {:?}", other),
        }
        assert!(payment.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_argument_is_recoverable() {
        let payment = Arc::new(RecordingPayment::default());
        let registry = registry(payment.clone());
        let bare = Incident::new("payment_failed", "{}");

        let result = registry
            .dispatch(&call("get_payment_methods", json!({})), &bare)
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(result.payload["error"]
            .as_str()
            .unwrap()
            .contains("user_id"));
    }

    #[tokio::test]
    async fn test_collaborator_failure_becomes_error_payload() {
        let payment = Arc::new(RecordingPayment {
            fail: true,
            ..Default::default()
        });
        let registry = registry(payment.clone());

        let result = registry
            .dispatch(&call("get_payment_methods", json!({})), &incident())
            .await
            .unwrap();

        assert!(result.is_error());
        assert!(result.payload["error"]
            .as_str()
            .unwrap()
            .contains("connection refused"));
    }

    #[tokio::test]
    async fn test_knowledge_base_unavailable_without_client() {
        let payment = Arc::new(RecordingPayment::default());
        let registry = registry(payment);

        let result = registry
            .dispatch(
                &call("query_knowledge_base", json!({ "query": "failed payment policy" })),
                &incident(),
            )
            .await
            .unwrap();

        assert_eq!(result.payload, json!({ "error": "unavailable" }));
    }

    #[test]
    fn test_known_capabilities() {
        assert!(ToolRegistry::is_known("get_payment_methods"));
        assert!(ToolRegistry::is_known("escalate_to_human"));
        assert!(!ToolRegistry::is_known("browse_web"));
    }
}

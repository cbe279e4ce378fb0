//! Escalation desk
//!
//! Hands an incident off to human review. Ticket creation is a local
//! synthetic operation with no network dependency.

use async_trait::async_trait;
use rand::Rng;
use serde_json::{json, Value};

use crate::core::Result;

/// Escalation collaborator contract
#[async_trait]
pub trait EscalationApi: Send + Sync {
    /// Open a review ticket for an order
    async fn escalate(&self, order_id: i64, reason: &str) -> Result<Value>;
}

/// Local escalation desk producing synthetic tickets
#[derive(Debug, Clone, Default)]
pub struct EscalationDesk;

impl EscalationDesk {
    /// Create a new escalation desk
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EscalationApi for EscalationDesk {
    async fn escalate(&self, order_id: i64, reason: &str) -> Result<Value> {
        let suffix: u32 = rand::rng().random_range(1000..10000);
        let ticket_id = format!("esc-{}-{}", order_id, suffix);

        tracing::info!(%ticket_id, order_id, reason, "incident escalated to human review");

        Ok(json!({
            "ticket_id": ticket_id,
            "status": "queued",
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_escalate_produces_ticket() {
        let desk = EscalationDesk::new();
        let result = desk.escalate(7, "no recoverable payment method").await.unwrap();

        let ticket_id = result["ticket_id"].as_str().unwrap();
        assert!(ticket_id.starts_with("esc-7-"));
        assert_eq!(result["status"], "queued");
    }
}

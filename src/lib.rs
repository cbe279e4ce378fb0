//! Aegis - Autonomous Payment-Incident Resolution Agent
//!
//! Resolves payment-failure incidents by driving a multi-turn conversation
//! with a local LLM, interleaving model responses with tool invocations
//! against the payment service, the policy knowledge base, and a human
//! escalation desk.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Model provider abstraction with an Ollama implementation
//! - **Tools**: Capability registry and the tool collaborator clients
//! - **Agent**: Expectation policy, response interpreter, and the resolver loop
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use aegis::agent::Resolver;
//! use aegis::core::{Config, Incident};
//! use aegis::llm::OllamaModel;
//! use aegis::tools::{EscalationDesk, PaymentClient, ToolRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let model = Arc::new(OllamaModel::from_config(&config));
//!     let tools = ToolRegistry::new(
//!         Arc::new(PaymentClient::from_config(&config)),
//!         None,
//!         Arc::new(EscalationDesk::new()),
//!     );
//!
//!     let resolver = Resolver::new(Some(model), tools, &config.agent);
//!     let incident = Incident::new("payment_failed", r#"{"user_id": 42, "order_id": 7}"#);
//!
//!     let resolution = resolver.resolve(&incident).await;
//!     println!("{}: {}", resolution.outcome.status, resolution.outcome.summary);
//! }
//! ```

pub mod agent;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use crate::agent::{Resolution, Resolver};
pub use crate::core::{AegisError, AgentOutcome, Config, Incident, OutcomeStatus, Result};

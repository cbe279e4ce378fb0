//! Tools module - tool capabilities and their collaborators
//!
//! Contains the capability registry/dispatcher and the payment, knowledge
//! base, and escalation collaborator clients.

pub mod escalation;
pub mod knowledge;
pub mod payment;
pub mod registry;

pub use escalation::{EscalationApi, EscalationDesk};
pub use knowledge::{PolicySearch, SearchClient};
pub use payment::{PaymentApi, PaymentClient};
pub use registry::ToolRegistry;

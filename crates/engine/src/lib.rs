//! Negotiation engine
//!
//! The decision core of the negotiation agent:
//! - [`escalation::EscalationEngine`] - the ordered, first-match,
//!   fail-closed escalation rule chain
//! - [`response::ResponseGenerator`] - generic and knowledge-personalized
//!   reply generation with the technical-error safety net
//! - [`prompt`] - personalized prompt composition (the future model seam)
//! - [`handoff`] - reason-keyed human handoff messages
//! - [`orchestrator::NegotiationOrchestrator`] - the per-turn state machine
//!   with per-conversation turn serialization and retryable persistence

pub mod error;
pub mod escalation;
pub mod handoff;
pub mod orchestrator;
pub mod prompt;
pub mod response;

pub use error::EngineError;
pub use escalation::{EscalationEngine, RuleContext};
pub use handoff::handoff_message;
pub use orchestrator::{NegotiationOrchestrator, TurnOutcome};
pub use prompt::{personalized_prompt, PromptComposer};
pub use response::ResponseGenerator;

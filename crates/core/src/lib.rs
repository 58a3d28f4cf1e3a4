//! Core types for the negotiation agent
//!
//! Shared across all other crates:
//! - Conversation, message and proposal records
//! - Negotiation limits and escalation thresholds
//! - Message analysis and escalation decision types
//! - Knowledge-base records (corporate and debtor layers)
//! - Analytics events
//! - The TTL cache component
//! - Error types

pub mod analysis;
pub mod analytics;
pub mod cache;
pub mod conversation;
pub mod error;
pub mod escalation;
pub mod knowledge;
pub mod limits;
pub mod proposal;
pub mod response;

pub use analysis::{Analysis, Complexity, Keyword, MessageIntent, Sentiment};
pub use analytics::{AnalyticsEvent, NegotiationOutcome};
pub use cache::TtlCache;
pub use conversation::{
    Conversation, ConversationStatus, Message, MessageMetadata, NegotiationContext, SenderType,
};
pub use error::{Error, Result};
pub use escalation::{EscalationDecision, EscalationPriority, EscalationReason};
pub use knowledge::{
    AiConfig, BehaviorProfile, CommunicationStyle, ContactMethod, CorporateKnowledge,
    CorporatePolicy, CorporateProfile, DebtInfo, DebtorInfo, DebtorKnowledge, NegotiationSummary,
    NegotiationTendency, PaymentPattern, PaymentRecord, PersonalizationData, ResponseTemplate,
    RiskLevel,
};
pub use limits::{EscalationThresholds, NegotiationLimits};
pub use proposal::{Proposal, ProposalStatus};
pub use response::{AiResponse, PersonalizationLevel, ResponseType};

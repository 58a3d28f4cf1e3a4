//! Conversation and message types
//!
//! A conversation is one negotiation thread between a debtor and a corporate
//! client's agent (AI or human) over a specific proposal. Messages form an
//! append-only log owned by their conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::Analysis;
use crate::escalation::EscalationReason;
use crate::limits::NegotiationLimits;
use crate::response::{PersonalizationLevel, ResponseType};

/// Conversation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Created, AI engaged, waiting for the negotiation to start
    Active,
    /// AI actively responding to debtor messages
    #[default]
    Negotiating,
    /// Handed to a human representative; terminal for the AI
    Escalated,
    /// Debtor accepted terms (terminal)
    Agreed,
    /// Debtor rejected terms (terminal)
    Rejected,
    /// Abandoned without resolution (terminal)
    Abandoned,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Negotiating => "negotiating",
            Self::Escalated => "escalated",
            Self::Agreed => "agreed",
            Self::Rejected => "rejected",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "negotiating" => Self::Negotiating,
            "escalated" => Self::Escalated,
            "agreed" => Self::Agreed,
            "rejected" => Self::Rejected,
            "abandoned" => Self::Abandoned,
            _ => Self::Active,
        }
    }

    /// Terminal statuses accept no further transitions at all
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Agreed | Self::Rejected | Self::Abandoned)
    }

    /// Allowed transitions from the current status
    pub fn allowed_transitions(&self) -> &'static [ConversationStatus] {
        use ConversationStatus::*;
        match self {
            Active => &[Negotiating, Agreed, Rejected, Abandoned],
            Negotiating => &[Escalated, Agreed, Rejected, Abandoned],
            Escalated => &[Agreed, Rejected, Abandoned],
            Agreed | Rejected | Abandoned => &[],
        }
    }

    pub fn can_transition_to(&self, target: ConversationStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// Whether the AI may generate a reply while the conversation is in this
    /// status. Escalated and terminal conversations never accept AI turns.
    pub fn accepts_ai_turns(&self) -> bool {
        matches!(self, Self::Active | Self::Negotiating)
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the proposal figures and policy limits captured when the
/// negotiation starts. Embedded in the conversation so a turn never depends
/// on the proposal record mutating underneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegotiationContext {
    /// Total amount owed under the proposal
    pub total_amount: f64,
    /// Number of installments offered
    pub installments: u32,
    /// Amount per installment
    pub installment_amount: f64,
    /// Policy ceilings in force for this negotiation
    pub limits: NegotiationLimits,
}

/// One negotiation thread between a debtor and a corporate client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub proposal_id: Uuid,
    pub debtor_id: Uuid,
    pub company_id: Uuid,
    /// Corporate client whose policies bound this negotiation, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corporate_client_id: Option<Uuid>,
    pub status: ConversationStatus,
    /// Forced to false the instant the conversation escalates
    pub ai_enabled: bool,
    /// Incremented only after a message is durably appended
    pub message_count: u32,
    pub negotiation_context: NegotiationContext,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation entering the negotiating state
    pub fn new(
        proposal_id: Uuid,
        debtor_id: Uuid,
        company_id: Uuid,
        corporate_client_id: Option<Uuid>,
        negotiation_context: NegotiationContext,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            proposal_id,
            debtor_id,
            company_id,
            corporate_client_id,
            status: ConversationStatus::Negotiating,
            ai_enabled: true,
            message_count: 0,
            negotiation_context,
            created_at: now,
            updated_at: now,
        }
    }

    /// Duration since the conversation was created, in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (Utc::now() - self.created_at).num_minutes()
    }

    /// Whether an inbound debtor message may be answered by the AI
    pub fn accepts_ai_turns(&self) -> bool {
        self.ai_enabled && self.status.accepts_ai_turns()
    }

    /// Apply a status transition, enforcing the state machine and the
    /// escalation invariant (escalated conversations lose AI control).
    pub fn transition_to(&mut self, target: ConversationStatus) -> Result<(), crate::Error> {
        if !self.status.can_transition_to(target) {
            return Err(crate::Error::InvalidTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        if target == ConversationStatus::Escalated {
            self.ai_enabled = false;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Debtor,
    AiAssistant,
    HumanAgent,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debtor => "debtor",
            Self::AiAssistant => "ai_assistant",
            Self::HumanAgent => "human_agent",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "debtor" => Self::Debtor,
            "ai_assistant" => Self::AiAssistant,
            "human_agent" => Self::HumanAgent,
            _ => Self::Debtor,
        }
    }
}

impl std::fmt::Display for SenderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata attached to an AI-authored message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Analysis snapshot of the debtor message this turn answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    /// Confidence of the generated response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_level: Option<PersonalizationLevel>,
    /// Set when this message is an escalation handoff
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub escalation_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_reason: Option<EscalationReason>,
}

/// One turn in a conversation. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: SenderType,
    pub content: String,
    #[serde(default)]
    pub metadata: MessageMetadata,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(conversation_id: Uuid, sender: SenderType, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id,
            sender,
            content: content.into(),
            metadata: MessageMetadata::default(),
            created_at: Utc::now(),
        }
    }

    /// Create a debtor turn
    pub fn debtor(conversation_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(conversation_id, SenderType::Debtor, content)
    }

    /// Create an AI turn
    pub fn ai(conversation_id: Uuid, content: impl Into<String>) -> Self {
        Self::new(conversation_id, SenderType::AiAssistant, content)
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::NegotiationLimits;

    fn context() -> NegotiationContext {
        NegotiationContext {
            total_amount: 120_000.0,
            installments: 12,
            installment_amount: 10_000.0,
            limits: NegotiationLimits::default(),
        }
    }

    #[test]
    fn escalation_disables_ai() {
        let mut conv = Conversation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            context(),
        );
        assert!(conv.accepts_ai_turns());

        conv.transition_to(ConversationStatus::Escalated).unwrap();
        assert!(!conv.ai_enabled);
        assert!(!conv.accepts_ai_turns());
    }

    #[test]
    fn terminal_statuses_reject_transitions() {
        let mut conv = Conversation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            context(),
        );
        conv.transition_to(ConversationStatus::Agreed).unwrap();
        assert!(conv
            .transition_to(ConversationStatus::Negotiating)
            .is_err());
    }

    #[test]
    fn escalated_allows_human_outcome() {
        let status = ConversationStatus::Escalated;
        assert!(status.can_transition_to(ConversationStatus::Agreed));
        assert!(status.can_transition_to(ConversationStatus::Rejected));
        assert!(!status.can_transition_to(ConversationStatus::Negotiating));
        assert!(!status.accepts_ai_turns());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            ConversationStatus::Active,
            ConversationStatus::Negotiating,
            ConversationStatus::Escalated,
            ConversationStatus::Agreed,
            ConversationStatus::Rejected,
            ConversationStatus::Abandoned,
        ] {
            assert_eq!(ConversationStatus::parse(status.as_str()), status);
        }
    }
}

//! Escalation decision types

use serde::{Deserialize, Serialize};

/// Why a conversation was handed to a human
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// Debtor explicitly asked for a human
    UserRequestedHuman,
    /// Conversation reached the configured message limit
    MessageLimitExceeded,
    /// Distress language pushed sentiment below the floor
    NegativeSentiment,
    /// Requested discount exceeds the policy threshold
    HighDiscountRequest,
    /// Requested term exceeds the policy threshold
    ExtendedTimeRequest,
    /// The engine could not safely evaluate the conversation
    TechnicalError,
}

impl EscalationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserRequestedHuman => "user_requested_human",
            Self::MessageLimitExceeded => "message_limit_exceeded",
            Self::NegativeSentiment => "negative_sentiment",
            Self::HighDiscountRequest => "high_discount_request",
            Self::ExtendedTimeRequest => "extended_time_request",
            Self::TechnicalError => "technical_error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user_requested_human" => Some(Self::UserRequestedHuman),
            "message_limit_exceeded" => Some(Self::MessageLimitExceeded),
            "negative_sentiment" => Some(Self::NegativeSentiment),
            "high_discount_request" => Some(Self::HighDiscountRequest),
            "extended_time_request" => Some(Self::ExtendedTimeRequest),
            "technical_error" => Some(Self::TechnicalError),
            _ => None,
        }
    }
}

impl std::fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handoff urgency communicated to the human queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPriority {
    Low,
    Medium,
    High,
}

impl EscalationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Outcome of the escalation rule chain for one turn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub should_escalate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<EscalationReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<EscalationPriority>,
}

impl EscalationDecision {
    /// The continue-negotiating decision
    pub fn stay() -> Self {
        Self {
            should_escalate: false,
            reason: None,
            priority: None,
        }
    }

    pub fn escalate(reason: EscalationReason, priority: EscalationPriority) -> Self {
        Self {
            should_escalate: true,
            reason: Some(reason),
            priority: Some(priority),
        }
    }
}

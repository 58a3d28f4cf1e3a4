//! Analytics event types
//!
//! Terminal and milestone records, append-only. Aggregation is always a
//! read-side computation over this log and can be redone from scratch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal outcome of a negotiation, when one applies to the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegotiationOutcome {
    Agreement,
    Escalated,
    Abandoned,
}

impl NegotiationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agreement => "agreement",
            Self::Escalated => "escalated",
            Self::Abandoned => "abandoned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "agreement" => Some(Self::Agreement),
            "escalated" => Some(Self::Escalated),
            "abandoned" => Some(Self::Abandoned),
            _ => None,
        }
    }
}

/// One analytics record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub company_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<Uuid>,
    /// Action that produced the event, e.g. "negotiation_completed"
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<NegotiationOutcome>,
    pub conversation_duration_minutes: i64,
    /// AI-authored messages in the conversation at event time
    pub ai_messages: u32,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsEvent {
    pub fn new(company_id: Uuid, event_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_id,
            proposal_id: None,
            event_type: event_type.into(),
            outcome: None,
            conversation_duration_minutes: 0,
            ai_messages: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_proposal(mut self, proposal_id: Uuid) -> Self {
        self.proposal_id = Some(proposal_id);
        self
    }

    pub fn with_outcome(mut self, outcome: NegotiationOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn with_duration_minutes(mut self, minutes: i64) -> Self {
        self.conversation_duration_minutes = minutes;
        self
    }

    pub fn with_ai_messages(mut self, count: u32) -> Self {
        self.ai_messages = count;
        self
    }
}

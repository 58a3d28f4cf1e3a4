//! Proposal types
//!
//! The payment terms under negotiation. Read-only from the negotiation
//! core's perspective; only numeric fields are consulted when computing
//! discount and term figures.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proposal lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Open,
    InNegotiation,
    Accepted,
    Rejected,
    Expired,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InNegotiation => "in_negotiation",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "open" => Self::Open,
            "in_negotiation" => Self::InNegotiation,
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            "expired" => Self::Expired,
            _ => Self::Open,
        }
    }
}

/// Payment terms offered to a debtor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: Uuid,
    pub company_id: Uuid,
    pub total_amount: f64,
    pub installments: u32,
    pub installment_amount: f64,
    pub status: ProposalStatus,
}

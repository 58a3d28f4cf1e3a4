//! Centralized tunable constants
//!
//! Single source of truth for the values the settings defaults reference.
//! Policy-level negotiation defaults (discount/term ceilings, escalation
//! thresholds) live in `negotiation_agent_core::limits` next to the types
//! they parameterize.

/// Retry and timeout budget for one conversation turn
pub mod turn {
    /// Store operations retry this many times before the turn fails
    pub const MAX_RETRIES: u32 = 3;
    /// Response generation is abandoned after this many seconds
    pub const TIMEOUT_SECS: u64 = 30;
}

/// Cache lifetimes
pub mod cache {
    /// Corporate knowledge entries live this long
    pub const CORPORATE_TTL_SECS: u64 = 300;
    /// General metrics per company live this long
    pub const METRICS_TTL_SECS: u64 = 300;
}

/// History window sizes for debtor knowledge resolution
pub mod history {
    /// Most-recent negotiation summaries joined per resolution
    pub const NEGOTIATION_LIMIT: usize = 5;
    /// Most-recent payments joined per resolution
    pub const PAYMENT_LIMIT: usize = 10;
    /// Prior negotiation summaries embedded in a personalized prompt
    pub const PROMPT_NEGOTIATION_LIMIT: usize = 2;
}

//! Negotiation limits and escalation thresholds
//!
//! Per corporate-client policy ceilings. Every field is overridable from the
//! corporate AI config; the defaults below apply whenever the config is
//! absent or partial.

use serde::{Deserialize, Serialize};

/// Default maximum discount the AI may discuss (percent)
pub const DEFAULT_MAX_DISCOUNT_PERCENT: f64 = 15.0;
/// Default maximum term the AI may discuss (months)
pub const DEFAULT_MAX_TERM_MONTHS: u32 = 12;
/// Default message count at which a conversation escalates
pub const DEFAULT_CONVERSATION_LENGTH_THRESHOLD: u32 = 15;
/// Default requested-discount percent above which a conversation escalates
pub const DEFAULT_DISCOUNT_REQUESTED_THRESHOLD: u32 = 20;
/// Default requested-term months above which a conversation escalates
pub const DEFAULT_TIME_REQUESTED_THRESHOLD: u32 = 18;

/// Thresholds feeding the escalation rule chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscalationThresholds {
    /// Escalate at this many messages in the conversation (inclusive)
    #[serde(default = "default_conversation_length")]
    pub conversation_length: u32,
    /// Escalate when the debtor asks for more than this discount percent
    #[serde(default = "default_discount_requested")]
    pub discount_requested: u32,
    /// Escalate when the debtor asks for more than this many months
    #[serde(default = "default_time_requested")]
    pub time_requested: u32,
}

fn default_conversation_length() -> u32 {
    DEFAULT_CONVERSATION_LENGTH_THRESHOLD
}

fn default_discount_requested() -> u32 {
    DEFAULT_DISCOUNT_REQUESTED_THRESHOLD
}

fn default_time_requested() -> u32 {
    DEFAULT_TIME_REQUESTED_THRESHOLD
}

impl Default for EscalationThresholds {
    fn default() -> Self {
        Self {
            conversation_length: DEFAULT_CONVERSATION_LENGTH_THRESHOLD,
            discount_requested: DEFAULT_DISCOUNT_REQUESTED_THRESHOLD,
            time_requested: DEFAULT_TIME_REQUESTED_THRESHOLD,
        }
    }
}

/// Policy ceiling bounding what the AI may offer in one negotiation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NegotiationLimits {
    #[serde(default = "default_max_discount")]
    pub max_discount_percent: f64,
    #[serde(default = "default_max_term")]
    pub max_term_months: u32,
    #[serde(default)]
    pub escalation_thresholds: EscalationThresholds,
}

fn default_max_discount() -> f64 {
    DEFAULT_MAX_DISCOUNT_PERCENT
}

fn default_max_term() -> u32 {
    DEFAULT_MAX_TERM_MONTHS
}

impl Default for NegotiationLimits {
    fn default() -> Self {
        Self {
            max_discount_percent: DEFAULT_MAX_DISCOUNT_PERCENT,
            max_term_months: DEFAULT_MAX_TERM_MONTHS,
            escalation_thresholds: EscalationThresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_defaults() {
        let limits = NegotiationLimits::default();
        assert_eq!(limits.max_discount_percent, 15.0);
        assert_eq!(limits.max_term_months, 12);
        assert_eq!(limits.escalation_thresholds.conversation_length, 15);
        assert_eq!(limits.escalation_thresholds.discount_requested, 20);
        assert_eq!(limits.escalation_thresholds.time_requested, 18);
    }
}

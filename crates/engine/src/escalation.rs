//! Escalation decision engine
//!
//! An explicit ordered list of rules evaluated first-match. The ordering is
//! load-bearing: an explicit human request must win over every numeric
//! threshold, and the chain must short-circuit rather than score. Encoding
//! the rules as data makes the order a structural property instead of a
//! code-review obligation.

use negotiation_agent_analysis::{AmountExtractor, RegexAmountExtractor};
use negotiation_agent_core::{
    Analysis, Conversation, DebtorKnowledge, EscalationDecision, EscalationPriority,
    EscalationReason, Keyword, NegotiationLimits,
};

/// Inputs shared by every rule, with numeric amounts extracted once
pub struct RuleContext<'a> {
    pub message: &'a str,
    pub analysis: &'a Analysis,
    pub conversation: &'a Conversation,
    pub limits: &'a NegotiationLimits,
    pub debtor: Option<&'a DebtorKnowledge>,
    /// Requested discount percent, 0 when none named
    pub discount_requested: u32,
    /// Requested term months, 0 when none named
    pub months_requested: u32,
}

/// One entry in the ordered chain
struct EscalationRule {
    reason: EscalationReason,
    priority: EscalationPriority,
    matches: fn(&RuleContext<'_>) -> bool,
}

/// The escalation decision engine
pub struct EscalationEngine {
    extractor: Box<dyn AmountExtractor>,
    rules: Vec<EscalationRule>,
}

impl Default for EscalationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EscalationEngine {
    pub fn new() -> Self {
        Self::with_extractor(Box::new(RegexAmountExtractor::new()))
    }

    /// Swap the numeric extractor without touching the rule chain
    pub fn with_extractor(extractor: Box<dyn AmountExtractor>) -> Self {
        Self {
            extractor,
            rules: Self::rule_chain(),
        }
    }

    /// The ordered chain. Do not reorder: first match wins.
    fn rule_chain() -> Vec<EscalationRule> {
        vec![
            EscalationRule {
                reason: EscalationReason::UserRequestedHuman,
                priority: EscalationPriority::High,
                matches: |ctx| ctx.analysis.has_keyword(Keyword::Human),
            },
            EscalationRule {
                reason: EscalationReason::MessageLimitExceeded,
                priority: EscalationPriority::Medium,
                matches: |ctx| {
                    ctx.conversation.message_count
                        >= ctx.limits.escalation_thresholds.conversation_length
                },
            },
            EscalationRule {
                reason: EscalationReason::NegativeSentiment,
                priority: EscalationPriority::High,
                matches: |ctx| ctx.analysis.sentiment_score < 0.3,
            },
            EscalationRule {
                reason: EscalationReason::HighDiscountRequest,
                priority: EscalationPriority::Medium,
                matches: |ctx| {
                    ctx.analysis.has_keyword(Keyword::Discount)
                        && ctx.discount_requested > ctx.limits.escalation_thresholds.discount_requested
                },
            },
            EscalationRule {
                reason: EscalationReason::ExtendedTimeRequest,
                priority: EscalationPriority::Medium,
                matches: |ctx| {
                    ctx.analysis.has_keyword(Keyword::Time)
                        && ctx.months_requested > ctx.limits.escalation_thresholds.time_requested
                },
            },
        ]
    }

    /// Evaluate the chain for one turn
    pub fn decide(
        &self,
        message: &str,
        analysis: &Analysis,
        conversation: &Conversation,
        limits: &NegotiationLimits,
        debtor: Option<&DebtorKnowledge>,
    ) -> EscalationDecision {
        let ctx = RuleContext {
            message,
            analysis,
            conversation,
            limits,
            debtor,
            discount_requested: self.extractor.discount_percent(message),
            months_requested: self.extractor.term_months(message),
        };

        for rule in &self.rules {
            if (rule.matches)(&ctx) {
                tracing::info!(
                    conversation_id = %conversation.id,
                    reason = rule.reason.as_str(),
                    priority = rule.priority.as_str(),
                    "Escalation rule matched"
                );
                return EscalationDecision::escalate(rule.reason, rule.priority);
            }
        }

        EscalationDecision::stay()
    }

    /// Evaluate the chain, failing closed
    ///
    /// A panic anywhere in evaluation yields an escalation with reason
    /// technical_error rather than silently continuing an AI conversation
    /// the engine cannot safely assess.
    pub fn decide_or_fail_closed(
        &self,
        message: &str,
        analysis: &Analysis,
        conversation: &Conversation,
        limits: &NegotiationLimits,
        debtor: Option<&DebtorKnowledge>,
    ) -> EscalationDecision {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.decide(message, analysis, conversation, limits, debtor)
        }));

        match result {
            Ok(decision) => decision,
            Err(_) => {
                tracing::error!(
                    conversation_id = %conversation.id,
                    "Escalation evaluation panicked, failing closed"
                );
                EscalationDecision::escalate(
                    EscalationReason::TechnicalError,
                    EscalationPriority::High,
                )
            }
        }
    }
}

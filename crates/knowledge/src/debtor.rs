//! Debtor knowledge resolution
//!
//! Joins the debt record with bounded recent history (at most 5 negotiation
//! summaries, 10 payments) and derives the behavior profile and
//! personalization data. Never cached: the result must reflect the latest
//! payment and negotiation state at every turn.

use std::sync::Arc;

use negotiation_agent_analysis::lexicon;
use negotiation_agent_config::constants::history;
use negotiation_agent_core::{
    BehaviorProfile, CommunicationStyle, DebtInfo, DebtorInfo, DebtorKnowledge,
    NegotiationSummary, NegotiationTendency, PaymentPattern, PaymentRecord, PersonalizationData,
    RiskLevel,
};
use negotiation_agent_persistence::DebtorStore;
use uuid::Uuid;

use crate::KnowledgeError;

/// Resolver for the debtor knowledge layer
pub struct DebtorKnowledgeResolver {
    store: Arc<dyn DebtorStore>,
}

impl DebtorKnowledgeResolver {
    pub fn new(store: Arc<dyn DebtorStore>) -> Self {
        Self { store }
    }

    /// Resolve the debtor knowledge for one (debtor, corporate client) pair
    ///
    /// History is per debtor; the corporate client id scopes logging and
    /// future per-client history partitioning. Missing records degrade to
    /// defaults - absence of knowledge is never an error.
    pub async fn resolve(
        &self,
        debtor_id: Uuid,
        corporate_client_id: Option<Uuid>,
    ) -> Result<DebtorKnowledge, KnowledgeError> {
        let personal = self
            .store
            .debtor_info(debtor_id)
            .await?
            .unwrap_or(DebtorInfo {
                id: debtor_id,
                name: None,
                email: None,
                phone: None,
                preferred_contact_method: None,
            });

        let debt = self.store.debt_info(debtor_id).await?.unwrap_or_default();

        let negotiation_history = self
            .store
            .recent_negotiations(debtor_id, history::NEGOTIATION_LIMIT)
            .await?;
        let payment_history = self
            .store
            .recent_payments(debtor_id, history::PAYMENT_LIMIT)
            .await?;

        let behavior = derive_behavior_profile(&negotiation_history, &payment_history);
        let personalization = PersonalizationData {
            preferred_contact_method: personal.preferred_contact_method,
            communication_style: detect_communication_style(&negotiation_history),
            risk_level: derive_risk_level(&debt, &payment_history),
        };

        tracing::debug!(
            %debtor_id,
            corporate_client_id = ?corporate_client_id,
            negotiations = negotiation_history.len(),
            payments = payment_history.len(),
            risk = personalization.risk_level.as_str(),
            "Debtor knowledge resolved"
        );

        Ok(DebtorKnowledge {
            personal,
            debt,
            negotiation_history,
            payment_history,
            behavior,
            personalization,
        })
    }
}

/// Derive negotiation tendency and payment pattern from history
fn derive_behavior_profile(
    negotiations: &[NegotiationSummary],
    payments: &[PaymentRecord],
) -> BehaviorProfile {
    let negotiation_tendency = if negotiations.is_empty() {
        None
    } else {
        let agreed = negotiations.iter().filter(|n| n.agreed()).count() as f64;
        let ratio = agreed / negotiations.len() as f64;
        if ratio > 0.7 {
            Some(NegotiationTendency::Cooperative)
        } else if ratio < 0.3 {
            Some(NegotiationTendency::Resistant)
        } else {
            None
        }
    };

    let payment_pattern = if payments.is_empty() {
        PaymentPattern::Irregular
    } else {
        let on_time = payments.iter().filter(|p| p.on_time).count() as f64;
        let ratio = on_time / payments.len() as f64;
        if ratio > 0.8 {
            PaymentPattern::Regular
        } else if ratio < 0.3 {
            PaymentPattern::Delinquent
        } else {
            PaymentPattern::Irregular
        }
    };

    BehaviorProfile {
        negotiation_tendency,
        payment_pattern,
    }
}

/// Integer risk score over overdue days and late-payment ratio
///
/// Days overdue: +3 above 90, +2 above 60, +1 above 30. Late ratio: +3
/// above 0.7, +2 above 0.4, +1 above 0.2. Score of 5 or more is high,
/// 3 or more is medium, otherwise low.
fn derive_risk_level(debt: &DebtInfo, payments: &[PaymentRecord]) -> RiskLevel {
    let mut score = 0u32;

    score += if debt.days_overdue > 90 {
        3
    } else if debt.days_overdue > 60 {
        2
    } else if debt.days_overdue > 30 {
        1
    } else {
        0
    };

    if !payments.is_empty() {
        let late = payments.iter().filter(|p| !p.on_time).count() as f64;
        let late_ratio = late / payments.len() as f64;
        score += if late_ratio > 0.7 {
            3
        } else if late_ratio > 0.4 {
            2
        } else if late_ratio > 0.2 {
            1
        } else {
            0
        };
    }

    if score >= 5 {
        RiskLevel::High
    } else if score >= 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Majority vote between formal and informal markers across the debtor's
/// prior messages; a tie (including no history) resolves to professional.
///
/// Known limitation: the fixed marker lists scan at most the 5 retained
/// negotiation summaries, so the classification is a coarse heuristic.
fn detect_communication_style(negotiations: &[NegotiationSummary]) -> CommunicationStyle {
    let mut formal = 0usize;
    let mut informal = 0usize;

    for negotiation in negotiations {
        for message in &negotiation.debtor_messages {
            let text = message.to_lowercase();
            formal += lexicon::count_matches(&text, lexicon::FORMAL_MARKERS);
            informal += lexicon::count_matches(&text, lexicon::INFORMAL_MARKERS);
        }
    }

    match formal.cmp(&informal) {
        std::cmp::Ordering::Greater => CommunicationStyle::Formal,
        std::cmp::Ordering::Less => CommunicationStyle::Informal,
        std::cmp::Ordering::Equal => CommunicationStyle::Professional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use negotiation_agent_core::ConversationStatus;

    fn payment(on_time: bool) -> PaymentRecord {
        PaymentRecord {
            amount: 1_000.0,
            due_date: Utc::now(),
            paid_at: Some(Utc::now()),
            on_time,
        }
    }

    fn negotiation(status: ConversationStatus, messages: &[&str]) -> NegotiationSummary {
        NegotiationSummary {
            conversation_id: Uuid::new_v4(),
            status,
            summary: "negociación previa".into(),
            debtor_messages: messages.iter().map(|m| m.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn overdue_without_late_payments_is_medium_risk() {
        // days_overdue=95 scores 3; zero late payments add nothing
        let debt = DebtInfo {
            amount: 80_000.0,
            days_overdue: 95,
        };
        let payments: Vec<_> = (0..10).map(|_| payment(true)).collect();
        assert_eq!(derive_risk_level(&debt, &payments), RiskLevel::Medium);
    }

    #[test]
    fn overdue_and_late_payments_is_high_risk() {
        let debt = DebtInfo {
            amount: 80_000.0,
            days_overdue: 95,
        };
        let payments: Vec<_> = (0..10).map(|i| payment(i < 2)).collect();
        assert_eq!(derive_risk_level(&debt, &payments), RiskLevel::High);
    }

    #[test]
    fn fresh_debt_is_low_risk() {
        let debt = DebtInfo {
            amount: 5_000.0,
            days_overdue: 10,
        };
        assert_eq!(derive_risk_level(&debt, &[]), RiskLevel::Low);
    }

    #[test]
    fn cooperative_tendency_above_ratio() {
        let negotiations: Vec<_> = (0..4)
            .map(|i| {
                negotiation(
                    if i < 3 {
                        ConversationStatus::Agreed
                    } else {
                        ConversationStatus::Rejected
                    },
                    &[],
                )
            })
            .collect();
        let profile = derive_behavior_profile(&negotiations, &[]);
        assert_eq!(
            profile.negotiation_tendency,
            Some(NegotiationTendency::Cooperative)
        );
    }

    #[test]
    fn balanced_history_has_no_tendency() {
        let negotiations = vec![
            negotiation(ConversationStatus::Agreed, &[]),
            negotiation(ConversationStatus::Rejected, &[]),
        ];
        let profile = derive_behavior_profile(&negotiations, &[]);
        assert_eq!(profile.negotiation_tendency, None);
    }

    #[test]
    fn payment_patterns() {
        let regular: Vec<_> = (0..10).map(|i| payment(i != 0)).collect();
        assert_eq!(
            derive_behavior_profile(&[], &regular).payment_pattern,
            PaymentPattern::Regular
        );

        let delinquent: Vec<_> = (0..10).map(|i| payment(i < 2)).collect();
        assert_eq!(
            derive_behavior_profile(&[], &delinquent).payment_pattern,
            PaymentPattern::Delinquent
        );

        assert_eq!(
            derive_behavior_profile(&[], &[]).payment_pattern,
            PaymentPattern::Irregular
        );
    }

    #[test]
    fn style_majority_and_tie() {
        let formal = vec![negotiation(
            ConversationStatus::Agreed,
            &["Estimado señor, quisiera consultar mi saldo"],
        )];
        assert_eq!(
            detect_communication_style(&formal),
            CommunicationStyle::Formal
        );

        let informal = vec![negotiation(
            ConversationStatus::Agreed,
            &["hola, dale, porfa dime cuánto debo"],
        )];
        assert_eq!(
            detect_communication_style(&informal),
            CommunicationStyle::Informal
        );

        assert_eq!(
            detect_communication_style(&[]),
            CommunicationStyle::Professional
        );
    }

    #[tokio::test]
    async fn resolution_degrades_to_defaults() {
        use negotiation_agent_persistence::InMemoryDebtorStore;

        let store = Arc::new(InMemoryDebtorStore::new());
        let resolver = DebtorKnowledgeResolver::new(store);
        let debtor_id = Uuid::new_v4();

        let knowledge = resolver.resolve(debtor_id, None).await.unwrap();
        assert_eq!(knowledge.personal.id, debtor_id);
        assert!(knowledge.personal.name.is_none());
        assert_eq!(knowledge.behavior.negotiation_tendency, None);
        assert_eq!(
            knowledge.personalization.communication_style,
            CommunicationStyle::Professional
        );
        assert_eq!(knowledge.personalization.risk_level, RiskLevel::Low);
    }
}

//! Personalized prompt composition
//!
//! Builds the knowledge-grounded prompt for a negotiation turn: corporate
//! profile, debtor personal and debt info, behavior profile, the last two
//! negotiation summaries, the limits in force and every active custom
//! template. The deterministic generator uses it for traceability today;
//! it is also the seam where a language model can be plugged in behind the
//! same contract.

use negotiation_agent_config::constants::history;
use negotiation_agent_core::{
    Analysis, CorporateKnowledge, DebtorKnowledge, NegotiationContext, NegotiationLimits,
};

/// Builder assembling the personalized prompt section by section
#[derive(Debug, Default)]
pub struct PromptComposer {
    sections: Vec<String>,
}

impl PromptComposer {
    pub fn new() -> Self {
        Self::default()
    }

    fn section(mut self, title: &str, body: String) -> Self {
        self.sections.push(format!("## {}\n{}", title, body));
        self
    }

    /// Corporate identity and the policies in force
    pub fn corporate(mut self, corporate: &CorporateKnowledge) -> Self {
        let mut body = format!("Empresa: {}", corporate.profile.name);
        if let Some(description) = &corporate.profile.description {
            body.push_str(&format!("\nDescripción: {}", description));
        }
        for policy in &corporate.policies {
            body.push_str(&format!("\nPolítica [{}]: {}", policy.title, policy.content));
        }
        self = self.section("Cliente corporativo", body);

        if !corporate.response_templates.is_empty() {
            let templates = corporate
                .response_templates
                .iter()
                .map(|t| format!("- ({}) {}", t.trigger, t.content))
                .collect::<Vec<_>>()
                .join("\n");
            self = self.section("Plantillas personalizadas", templates);
        }
        self
    }

    /// Debtor identity, debt state and derived behavior profile
    pub fn debtor(mut self, debtor: &DebtorKnowledge) -> Self {
        let mut body = format!(
            "Deudor: {}\nDeuda: {:.2} ({} días de atraso)\nRiesgo: {}\nEstilo de comunicación: {}\nPatrón de pago: {}",
            debtor.display_name(),
            debtor.debt.amount,
            debtor.debt.days_overdue,
            debtor.personalization.risk_level.as_str(),
            debtor.personalization.communication_style.as_str(),
            debtor.behavior.payment_pattern.as_str(),
        );
        if let Some(tendency) = debtor.behavior.negotiation_tendency {
            body.push_str(&format!("\nTendencia: {:?}", tendency));
        }
        self = self.section("Perfil del deudor", body);

        let recent: Vec<_> = debtor
            .negotiation_history
            .iter()
            .take(history::PROMPT_NEGOTIATION_LIMIT)
            .map(|n| format!("- [{}] {}", n.status, n.summary))
            .collect();
        if !recent.is_empty() {
            self = self.section("Negociaciones previas", recent.join("\n"));
        }
        self
    }

    /// Limits the AI must not exceed in this negotiation
    pub fn limits(self, limits: &NegotiationLimits) -> Self {
        self.section(
            "Límites de negociación",
            format!(
                "Descuento máximo: {}%\nPlazo máximo: {} meses",
                limits.max_discount_percent, limits.max_term_months
            ),
        )
    }

    /// The proposal figures under discussion
    pub fn proposal(self, context: &NegotiationContext) -> Self {
        self.section(
            "Propuesta",
            format!(
                "Monto total: {:.2}\nCuotas: {} de {:.2}",
                context.total_amount, context.installments, context.installment_amount
            ),
        )
    }

    /// The inbound message and its analysis
    pub fn turn(self, message: &str, analysis: &Analysis) -> Self {
        self.section(
            "Mensaje del deudor",
            format!(
                "Intención: {}\nSentimiento: {}\nTexto: {}",
                analysis.intent,
                analysis.sentiment.as_str(),
                message
            ),
        )
    }

    pub fn compose(self) -> String {
        self.sections.join("\n\n")
    }
}

/// Assemble the full personalized prompt for one turn
pub fn personalized_prompt(
    message: &str,
    analysis: &Analysis,
    context: &NegotiationContext,
    debtor: &DebtorKnowledge,
    corporate: &CorporateKnowledge,
) -> String {
    PromptComposer::new()
        .corporate(corporate)
        .debtor(debtor)
        .proposal(context)
        .limits(&corporate.limits)
        .turn(message, analysis)
        .compose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use negotiation_agent_core::{
        BehaviorProfile, CommunicationStyle, ConversationStatus, CorporateProfile, DebtInfo,
        DebtorInfo, NegotiationSummary, PersonalizationData, RiskLevel,
    };
    use uuid::Uuid;

    fn debtor() -> DebtorKnowledge {
        DebtorKnowledge {
            personal: DebtorInfo {
                id: Uuid::new_v4(),
                name: Some("María López".into()),
                email: None,
                phone: None,
                preferred_contact_method: None,
            },
            debt: DebtInfo {
                amount: 45_000.0,
                days_overdue: 70,
            },
            negotiation_history: (0..4)
                .map(|i| NegotiationSummary {
                    conversation_id: Uuid::new_v4(),
                    status: ConversationStatus::Agreed,
                    summary: format!("acuerdo previo {}", i),
                    debtor_messages: vec![],
                    created_at: Utc::now(),
                })
                .collect(),
            payment_history: vec![],
            behavior: BehaviorProfile::default(),
            personalization: PersonalizationData {
                preferred_contact_method: None,
                communication_style: CommunicationStyle::Formal,
                risk_level: RiskLevel::Medium,
            },
        }
    }

    fn corporate() -> CorporateKnowledge {
        CorporateKnowledge {
            profile: CorporateProfile {
                id: Uuid::new_v4(),
                name: "Banco Andino".into(),
                description: None,
                industry: None,
            },
            policies: vec![],
            response_templates: vec![],
            limits: Default::default(),
        }
    }

    #[test]
    fn embeds_all_layers_and_truncates_history() {
        let context = NegotiationContext {
            total_amount: 45_000.0,
            installments: 9,
            installment_amount: 5_000.0,
            limits: Default::default(),
        };
        let analysis = Analysis::default();
        let prompt = personalized_prompt("¿puedo pagar en cuotas?", &analysis, &context, &debtor(), &corporate());

        assert!(prompt.contains("Banco Andino"));
        assert!(prompt.contains("María López"));
        assert!(prompt.contains("Descuento máximo: 15%"));
        // Only the last two prior negotiations are embedded
        assert!(prompt.contains("acuerdo previo 0"));
        assert!(prompt.contains("acuerdo previo 1"));
        assert!(!prompt.contains("acuerdo previo 2"));
    }
}

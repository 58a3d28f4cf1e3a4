//! Response generation
//!
//! Two paths produce the outbound message: the personalized path, used when
//! both knowledge layers are available, and the generic template path used
//! otherwise. Both select an intent-keyed content template; confidence is
//! the fixed constant of the resulting response type. Any internal failure
//! is absorbed into the technical-error safety net - the debtor always
//! receives a reply.

use negotiation_agent_core::{
    AiResponse, Analysis, CommunicationStyle, CorporateKnowledge, DebtorKnowledge, MessageIntent,
    NegotiationContext, NegotiationLimits, PersonalizationLevel, ResponseType, RiskLevel,
    EscalationReason,
};

use crate::prompt::personalized_prompt;
use crate::EngineError;

/// Fixed safety-net content returned when generation fails
const TECHNICAL_ERROR_CONTENT: &str = "Disculpe, estamos teniendo un inconveniente técnico. \
     Un representante revisará su caso y le responderá a la brevedad.";

/// The response generator
#[derive(Debug, Default)]
pub struct ResponseGenerator;

impl ResponseGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate the reply for one turn. Never fails: internal errors
    /// degrade to the technical-error response with forced escalation.
    pub fn generate(
        &self,
        message: &str,
        analysis: &Analysis,
        context: &NegotiationContext,
        limits: &NegotiationLimits,
        debtor: Option<&DebtorKnowledge>,
        corporate: Option<&CorporateKnowledge>,
    ) -> AiResponse {
        match self.try_generate(message, analysis, context, limits, debtor, corporate) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Response generation failed, engaging safety net");
                self.fallback_response(analysis)
            }
        }
    }

    /// The universal safety net: fixed content, confidence 0.1, forced
    /// escalation with reason technical_error.
    pub fn fallback_response(&self, analysis: &Analysis) -> AiResponse {
        let mut response = AiResponse::new(
            TECHNICAL_ERROR_CONTENT,
            ResponseType::TechnicalError,
            PersonalizationLevel::Medium,
        )
        .with_keywords(analysis.keywords.clone());
        response.escalation_triggered = true;
        response.escalation_reason = Some(EscalationReason::TechnicalError);
        response
    }

    fn try_generate(
        &self,
        message: &str,
        analysis: &Analysis,
        context: &NegotiationContext,
        limits: &NegotiationLimits,
        debtor: Option<&DebtorKnowledge>,
        corporate: Option<&CorporateKnowledge>,
    ) -> Result<AiResponse, EngineError> {
        let response = match (debtor, corporate) {
            (Some(debtor), Some(corporate)) => {
                self.generate_personalized(message, analysis, context, debtor, corporate)
            }
            _ => self.generate_generic(analysis, context, limits, debtor),
        };
        Ok(response.with_keywords(analysis.keywords.clone()))
    }

    /// Full-knowledge path: personalization level ultra_high
    fn generate_personalized(
        &self,
        message: &str,
        analysis: &Analysis,
        context: &NegotiationContext,
        debtor: &DebtorKnowledge,
        corporate: &CorporateKnowledge,
    ) -> AiResponse {
        let prompt = personalized_prompt(message, analysis, context, debtor, corporate);
        tracing::debug!(prompt_chars = prompt.len(), "Composed personalized prompt");

        let style = debtor.personalization.communication_style;
        let greeting = greeting(style, Some(debtor.display_name()));
        let corporate_name = corporate.profile.name.as_str();

        // A custom template configured for this intent takes precedence
        // over the built-in content.
        let (response_type, body) = match corporate.template_for(analysis.intent.as_str()) {
            Some(template) => (
                personalized_type(analysis.intent),
                substitute(&template.content, debtor, corporate, context),
            ),
            None => (
                personalized_type(analysis.intent),
                intent_body(analysis.intent, context, &corporate.limits, Some(corporate_name)),
            ),
        };

        let closing = risk_closing(debtor.personalization.risk_level, corporate_name);

        AiResponse::new(
            format!("{} {}{}", greeting, body, closing),
            response_type,
            PersonalizationLevel::UltraHigh,
        )
    }

    /// Partial/absent knowledge path: generic intent templates
    fn generate_generic(
        &self,
        analysis: &Analysis,
        context: &NegotiationContext,
        limits: &NegotiationLimits,
        debtor: Option<&DebtorKnowledge>,
    ) -> AiResponse {
        let name = debtor.and_then(|d| d.personal.name.as_deref());
        let greeting = greeting(CommunicationStyle::Professional, name);
        let body = intent_body(analysis.intent, context, limits, None);

        let level = if name.is_some() {
            PersonalizationLevel::High
        } else {
            PersonalizationLevel::Medium
        };

        AiResponse::new(
            format!("{} {}", greeting, body),
            generic_type(analysis.intent),
            level,
        )
    }
}

/// Response type per intent on the generic path
fn generic_type(intent: MessageIntent) -> ResponseType {
    match intent {
        MessageIntent::DiscountRequest => ResponseType::DiscountOffer,
        MessageIntent::InstallmentRequest => ResponseType::InstallmentOptions,
        MessageIntent::TimeRequest => ResponseType::TimeExtension,
        MessageIntent::Agreement => ResponseType::AgreementConfirmation,
        MessageIntent::HumanRequest | MessageIntent::Inquiry => ResponseType::GeneralInquiry,
    }
}

/// Response type per intent on the personalized path. Offer-type intents
/// keep their specific type (and confidence constant); open-ended turns
/// become personalized_response.
fn personalized_type(intent: MessageIntent) -> ResponseType {
    match intent {
        MessageIntent::DiscountRequest => ResponseType::DiscountOffer,
        MessageIntent::InstallmentRequest => ResponseType::InstallmentOptions,
        MessageIntent::TimeRequest => ResponseType::TimeExtension,
        MessageIntent::Agreement => ResponseType::AgreementConfirmation,
        MessageIntent::HumanRequest | MessageIntent::Inquiry => ResponseType::PersonalizedResponse,
    }
}

fn greeting(style: CommunicationStyle, name: Option<&str>) -> String {
    match (style, name) {
        (CommunicationStyle::Formal, Some(name)) => format!("Estimado/a {}:", name),
        (CommunicationStyle::Formal, None) => "Estimado cliente:".to_string(),
        (CommunicationStyle::Informal, Some(name)) => format!("¡Hola {}!", name),
        (CommunicationStyle::Informal, None) => "¡Hola!".to_string(),
        (CommunicationStyle::Professional, Some(name)) => format!("Hola {},", name),
        (CommunicationStyle::Professional, None) => "Hola,".to_string(),
    }
}

/// Intent-keyed content templates
fn intent_body(
    intent: MessageIntent,
    context: &NegotiationContext,
    limits: &NegotiationLimits,
    corporate_name: Option<&str>,
) -> String {
    let on_behalf = corporate_name
        .map(|n| format!(" en nombre de {}", n))
        .unwrap_or_default();

    match intent {
        MessageIntent::DiscountRequest => format!(
            "entendemos su solicitud de descuento. Podemos ofrecerle{} hasta un {}% de \
             descuento si liquida su deuda de {:.2} en los próximos días. ¿Le interesa \
             esta opción?",
            on_behalf, limits.max_discount_percent, context.total_amount
        ),
        MessageIntent::InstallmentRequest => format!(
            "con gusto revisamos un plan de pagos. Su propuesta actual contempla {} cuotas \
             de {:.2}. Podemos ajustar el esquema dentro de un plazo máximo de {} meses. \
             ¿Qué monto mensual le resultaría cómodo?",
            context.installments, context.installment_amount, limits.max_term_months
        ),
        MessageIntent::TimeRequest => format!(
            "entendemos que necesita más tiempo. Podemos extender el plazo hasta {} meses \
             manteniendo el total de {:.2}. ¿Le acomoda esa alternativa?",
            limits.max_term_months, context.total_amount
        ),
        MessageIntent::Agreement => format!(
            "¡excelente decisión! Registramos su aceptación del plan de {} cuotas de {:.2}. \
             En breve recibirá la confirmación con los datos de pago.",
            context.installments, context.installment_amount
        ),
        MessageIntent::HumanRequest | MessageIntent::Inquiry => format!(
            "gracias por su mensaje. Su propuesta vigente es de {:.2} en {} cuotas de {:.2}. \
             Puedo ayudarle con descuentos por pago anticipado, planes en cuotas o \
             extensiones de plazo. ¿Qué alternativa prefiere?",
            context.total_amount, context.installments, context.installment_amount
        ),
    }
}

/// Risk-dependent closing line on the personalized path
fn risk_closing(risk: RiskLevel, corporate_name: &str) -> String {
    match risk {
        RiskLevel::High => format!(
            " Le recomendamos aprovechar esta alternativa cuanto antes para evitar \
             gestiones adicionales por parte de {}.",
            corporate_name
        ),
        RiskLevel::Medium => " Quedamos atentos a su respuesta para avanzar.".to_string(),
        RiskLevel::Low => String::new(),
    }
}

/// Substitute the placeholders supported in custom templates
fn substitute(
    template: &str,
    debtor: &DebtorKnowledge,
    corporate: &CorporateKnowledge,
    context: &NegotiationContext,
) -> String {
    template
        .replace("{debtor_name}", debtor.display_name())
        .replace("{corporate_name}", &corporate.profile.name)
        .replace(
            "{max_discount}",
            &format!("{}", corporate.limits.max_discount_percent),
        )
        .replace(
            "{max_term}",
            &format!("{}", corporate.limits.max_term_months),
        )
        .replace("{total_amount}", &format!("{:.2}", context.total_amount))
        .replace("{installments}", &format!("{}", context.installments))
        .replace(
            "{installment_amount}",
            &format!("{:.2}", context.installment_amount),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation_agent_analysis::MessageAnalyzer;
    use negotiation_agent_core::{
        BehaviorProfile, CorporateProfile, DebtInfo, DebtorInfo, PersonalizationData,
        ResponseTemplate,
    };
    use uuid::Uuid;

    fn context() -> NegotiationContext {
        NegotiationContext {
            total_amount: 30_000.0,
            installments: 6,
            installment_amount: 5_000.0,
            limits: NegotiationLimits::default(),
        }
    }

    fn debtor(name: Option<&str>) -> DebtorKnowledge {
        DebtorKnowledge {
            personal: DebtorInfo {
                id: Uuid::new_v4(),
                name: name.map(String::from),
                email: None,
                phone: None,
                preferred_contact_method: None,
            },
            debt: DebtInfo {
                amount: 30_000.0,
                days_overdue: 40,
            },
            negotiation_history: vec![],
            payment_history: vec![],
            behavior: BehaviorProfile::default(),
            personalization: PersonalizationData::default(),
        }
    }

    fn corporate() -> CorporateKnowledge {
        CorporateKnowledge {
            profile: CorporateProfile {
                id: Uuid::new_v4(),
                name: "Cobranzas del Sur".into(),
                description: None,
                industry: None,
            },
            policies: vec![],
            response_templates: vec![],
            limits: NegotiationLimits::default(),
        }
    }

    fn generate(message: &str, debtor_k: Option<DebtorKnowledge>, corporate_k: Option<CorporateKnowledge>) -> AiResponse {
        let analyzer = MessageAnalyzer::new();
        let analysis = analyzer.analyze(message);
        ResponseGenerator::new().generate(
            message,
            &analysis,
            &context(),
            &NegotiationLimits::default(),
            debtor_k.as_ref(),
            corporate_k.as_ref(),
        )
    }

    #[test]
    fn agreement_confirmation_has_full_confidence() {
        let response = generate("gracias, de acuerdo", None, None);
        assert_eq!(response.response_type, ResponseType::AgreementConfirmation);
        assert_eq!(response.confidence, 1.0);
    }

    #[test]
    fn generic_without_name_is_medium() {
        let response = generate("¿cuál es mi saldo?", None, None);
        assert_eq!(response.response_type, ResponseType::GeneralInquiry);
        assert_eq!(response.confidence, 0.7);
        assert_eq!(response.personalization_level, PersonalizationLevel::Medium);
    }

    #[test]
    fn generic_with_name_is_high() {
        let response = generate("¿cuál es mi saldo?", Some(debtor(Some("Ana Ruiz"))), None);
        assert_eq!(response.personalization_level, PersonalizationLevel::High);
        assert!(response.content.contains("Ana Ruiz"));
    }

    #[test]
    fn full_knowledge_is_ultra_high() {
        let response = generate(
            "¿puedo pagar en cuotas?",
            Some(debtor(Some("Ana Ruiz"))),
            Some(corporate()),
        );
        assert_eq!(response.response_type, ResponseType::InstallmentOptions);
        assert_eq!(response.confidence, 0.95);
        assert_eq!(
            response.personalization_level,
            PersonalizationLevel::UltraHigh
        );
    }

    #[test]
    fn personalized_inquiry_uses_personalized_type() {
        let response = generate(
            "¿me explican la oferta?",
            Some(debtor(Some("Ana Ruiz"))),
            Some(corporate()),
        );
        assert_eq!(response.response_type, ResponseType::PersonalizedResponse);
        assert_eq!(response.confidence, 0.95);
    }

    #[test]
    fn custom_template_takes_precedence() {
        let mut corporate_k = corporate();
        corporate_k.response_templates.push(ResponseTemplate {
            id: Uuid::new_v4(),
            corporate_client_id: corporate_k.profile.id,
            trigger: "discount_request".into(),
            content: "{corporate_name} le ofrece a {debtor_name} hasta {max_discount}% de descuento.".into(),
            active: true,
        });

        let response = generate(
            "quiero un 10% de descuento",
            Some(debtor(Some("Ana Ruiz"))),
            Some(corporate_k),
        );
        assert!(response.content.contains("Cobranzas del Sur"));
        assert!(response.content.contains("Ana Ruiz"));
        assert!(response.content.contains("15%"));
    }

    #[test]
    fn fallback_is_fixed_and_escalates() {
        let analyzer = MessageAnalyzer::new();
        let analysis = analyzer.analyze("hola");
        let response = ResponseGenerator::new().fallback_response(&analysis);

        assert_eq!(response.response_type, ResponseType::TechnicalError);
        assert_eq!(response.confidence, 0.1);
        assert!(response.escalation_triggered);
        assert_eq!(
            response.escalation_reason,
            Some(EscalationReason::TechnicalError)
        );
    }

    #[test]
    fn keywords_carry_through() {
        let response = generate("quiero un descuento en mi pago", None, None);
        assert!(!response.keywords.is_empty());
    }
}

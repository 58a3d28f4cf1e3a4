//! Escalation handoff messages
//!
//! The last AI-authored message in an escalated conversation. Templates are
//! keyed by escalation reason and always name the debtor and the corporate
//! client, so the debtor knows a human is taking over and why.

use negotiation_agent_core::EscalationReason;

/// Build the reason-specific handoff message
pub fn handoff_message(
    reason: EscalationReason,
    debtor_name: Option<&str>,
    corporate_name: Option<&str>,
) -> String {
    let name = debtor_name.unwrap_or("estimado cliente");
    let company = corporate_name.unwrap_or("nuestro equipo");

    match reason {
        EscalationReason::UserRequestedHuman => format!(
            "{}, entendido: un representante de {} tomará esta conversación y le \
             responderá personalmente en breve.",
            name, company
        ),
        EscalationReason::MessageLimitExceeded => format!(
            "{}, para darle una mejor atención, un representante de {} continuará \
             esta negociación con usted directamente.",
            name, company
        ),
        EscalationReason::NegativeSentiment => format!(
            "{}, lamentamos su situación. Un representante de {} revisará su caso \
             personalmente para buscar una solución adecuada.",
            name, company
        ),
        EscalationReason::HighDiscountRequest => format!(
            "{}, su solicitud de descuento requiere una aprobación especial. Un \
             representante de {} la evaluará y le responderá en breve.",
            name, company
        ),
        EscalationReason::ExtendedTimeRequest => format!(
            "{}, el plazo que solicita requiere una revisión adicional. Un \
             representante de {} analizará su caso y le confirmará las opciones.",
            name, company
        ),
        EscalationReason::TechnicalError => format!(
            "{}, tuvimos un inconveniente procesando su mensaje. Un representante \
             de {} revisará la conversación y le responderá a la brevedad.",
            name, company
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_reason_has_a_template() {
        for reason in [
            EscalationReason::UserRequestedHuman,
            EscalationReason::MessageLimitExceeded,
            EscalationReason::NegativeSentiment,
            EscalationReason::HighDiscountRequest,
            EscalationReason::ExtendedTimeRequest,
            EscalationReason::TechnicalError,
        ] {
            let message = handoff_message(reason, Some("Ana"), Some("Banco Andino"));
            assert!(message.contains("Ana"));
            assert!(message.contains("Banco Andino"));
            assert!(message.contains("representante"));
        }
    }

    #[test]
    fn missing_names_fall_back_to_neutral_forms() {
        let message = handoff_message(EscalationReason::UserRequestedHuman, None, None);
        assert!(message.contains("estimado cliente"));
        assert!(message.contains("nuestro equipo"));
    }
}

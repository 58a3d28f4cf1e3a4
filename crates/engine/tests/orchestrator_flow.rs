//! End-to-end turn pipeline tests against in-memory stores

use std::sync::Arc;

use negotiation_agent_config::EngineConfig;
use negotiation_agent_core::{
    ConversationStatus, CorporateProfile, DebtInfo, DebtorInfo, EscalationReason,
    NegotiationOutcome, Proposal, ProposalStatus, ResponseType, SenderType,
};
use negotiation_agent_engine::{EngineError, NegotiationOrchestrator};
use negotiation_agent_persistence::PersistenceLayer;
use uuid::Uuid;

struct Fixture {
    stores: PersistenceLayer,
    orchestrator: Arc<NegotiationOrchestrator>,
    proposal_id: Uuid,
    debtor_id: Uuid,
    corporate_client_id: Uuid,
}

async fn fixture() -> Fixture {
    let stores = PersistenceLayer::in_memory();
    let proposal_id = Uuid::new_v4();
    let debtor_id = Uuid::new_v4();
    let corporate_client_id = Uuid::new_v4();
    let company_id = Uuid::new_v4();

    stores
        .proposals
        .upsert(&Proposal {
            id: proposal_id,
            company_id,
            total_amount: 60_000.0,
            installments: 12,
            installment_amount: 5_000.0,
            status: ProposalStatus::Open,
        })
        .await
        .unwrap();

    stores
        .debtors
        .upsert_debtor(&DebtorInfo {
            id: debtor_id,
            name: Some("Carlos Pérez".into()),
            email: None,
            phone: None,
            preferred_contact_method: None,
        })
        .await
        .unwrap();
    stores
        .debtors
        .upsert_debt(
            debtor_id,
            &DebtInfo {
                amount: 60_000.0,
                days_overdue: 45,
            },
        )
        .await
        .unwrap();

    stores
        .corporate
        .upsert_profile(&CorporateProfile {
            id: corporate_client_id,
            name: "Banco Andino".into(),
            description: None,
            industry: Some("banca".into()),
        })
        .await
        .unwrap();

    let orchestrator = Arc::new(NegotiationOrchestrator::new(
        stores.clone(),
        EngineConfig::default(),
    ));

    Fixture {
        stores,
        orchestrator,
        proposal_id,
        debtor_id,
        corporate_client_id,
    }
}

async fn set_message_count(fixture: &Fixture, conversation_id: Uuid, count: u32) {
    let mut conversation = fixture
        .stores
        .conversations
        .get(conversation_id)
        .await
        .unwrap()
        .unwrap();
    conversation.message_count = count;
    fixture
        .stores
        .conversations
        .update(&conversation)
        .await
        .unwrap();
}

#[tokio::test]
async fn start_negotiation_persists_opening_message() {
    let f = fixture().await;
    let conversation = f
        .orchestrator
        .start_negotiation(f.proposal_id, f.debtor_id, Some(f.corporate_client_id))
        .await
        .unwrap();

    assert_eq!(conversation.status, ConversationStatus::Negotiating);
    assert!(conversation.ai_enabled);
    assert_eq!(conversation.message_count, 1);

    let messages = f.stores.messages.list(conversation.id).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, SenderType::AiAssistant);
    assert!(messages[0].content.contains("Carlos Pérez"));
    assert!(messages[0].content.contains("Banco Andino"));

    let events = f
        .stores
        .analytics
        .list_for_company(conversation.company_id)
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_type, "negotiation_started");
}

#[tokio::test]
async fn unknown_proposal_is_an_error() {
    let f = fixture().await;
    let result = f
        .orchestrator
        .start_negotiation(Uuid::new_v4(), f.debtor_id, None)
        .await;
    assert!(matches!(result, Err(EngineError::ProposalNotFound(_))));
}

#[tokio::test]
async fn installment_turn_gets_personalized_reply() {
    let f = fixture().await;
    let conversation = f
        .orchestrator
        .start_negotiation(f.proposal_id, f.debtor_id, Some(f.corporate_client_id))
        .await
        .unwrap();

    let outcome = f
        .orchestrator
        .handle_debtor_message(conversation.id, "¿puedo pagar en cuotas más chicas?")
        .await
        .unwrap();

    assert!(!outcome.decision.should_escalate);
    assert_eq!(
        outcome.reply.metadata.response_type,
        Some(ResponseType::InstallmentOptions)
    );
    assert_eq!(outcome.reply.metadata.confidence, Some(0.95));
    assert_eq!(outcome.conversation.message_count, 3);

    let messages = f.stores.messages.list(conversation.id).await.unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].sender, SenderType::Debtor);
    assert_eq!(messages[2].sender, SenderType::AiAssistant);
}

#[tokio::test]
async fn human_request_escalates_and_disables_ai() {
    let f = fixture().await;
    let conversation = f
        .orchestrator
        .start_negotiation(f.proposal_id, f.debtor_id, Some(f.corporate_client_id))
        .await
        .unwrap();

    let outcome = f
        .orchestrator
        .handle_debtor_message(conversation.id, "Quiero hablar con una persona")
        .await
        .unwrap();

    assert!(outcome.decision.should_escalate);
    assert_eq!(
        outcome.decision.reason,
        Some(EscalationReason::UserRequestedHuman)
    );
    assert_eq!(outcome.conversation.status, ConversationStatus::Escalated);
    assert!(!outcome.conversation.ai_enabled);
    assert!(outcome.reply.metadata.escalation_triggered);
    assert!(outcome.reply.content.contains("representante"));
    assert!(outcome.reply.content.contains("Banco Andino"));

    // The handoff is terminal for the AI: the next turn is rejected
    let next = f
        .orchestrator
        .handle_debtor_message(conversation.id, "hola?")
        .await;
    assert!(matches!(next, Err(EngineError::AiTurnsRejected(_))));

    let events = f
        .stores
        .analytics
        .list_for_company(conversation.company_id)
        .await
        .unwrap();
    assert!(events
        .iter()
        .any(|e| e.outcome == Some(NegotiationOutcome::Escalated)));
}

#[tokio::test]
async fn message_limit_boundary_is_exact() {
    let f = fixture().await;

    // One message below the threshold: the positive turn goes through
    let conversation = f
        .orchestrator
        .start_negotiation(f.proposal_id, f.debtor_id, Some(f.corporate_client_id))
        .await
        .unwrap();
    set_message_count(&f, conversation.id, 14).await;

    let outcome = f
        .orchestrator
        .handle_debtor_message(conversation.id, "gracias, de acuerdo")
        .await
        .unwrap();
    assert!(!outcome.decision.should_escalate);
    assert_eq!(
        outcome.reply.metadata.response_type,
        Some(ResponseType::AgreementConfirmation)
    );
    assert_eq!(outcome.reply.metadata.confidence, Some(1.0));

    // At the threshold the same message escalates despite positive sentiment
    let second = f
        .orchestrator
        .start_negotiation(f.proposal_id, f.debtor_id, Some(f.corporate_client_id))
        .await
        .unwrap();
    set_message_count(&f, second.id, 15).await;

    let outcome = f
        .orchestrator
        .handle_debtor_message(second.id, "gracias, de acuerdo")
        .await
        .unwrap();
    assert!(outcome.decision.should_escalate);
    assert_eq!(
        outcome.decision.reason,
        Some(EscalationReason::MessageLimitExceeded)
    );
}

#[tokio::test]
async fn recorded_agreement_emits_event_and_history() {
    let f = fixture().await;
    let conversation = f
        .orchestrator
        .start_negotiation(f.proposal_id, f.debtor_id, Some(f.corporate_client_id))
        .await
        .unwrap();
    f.orchestrator
        .handle_debtor_message(conversation.id, "me parece bien el plan")
        .await
        .unwrap();

    let updated = f
        .orchestrator
        .record_outcome(conversation.id, ConversationStatus::Agreed)
        .await
        .unwrap();
    assert_eq!(updated.status, ConversationStatus::Agreed);
    assert!(!updated.ai_enabled);

    let events = f
        .stores
        .analytics
        .list_for_company(conversation.company_id)
        .await
        .unwrap();
    let completed = events
        .iter()
        .find(|e| e.event_type == "negotiation_completed")
        .expect("completion event");
    assert_eq!(completed.outcome, Some(NegotiationOutcome::Agreement));
    assert!(completed.ai_messages >= 2);

    // The conversation fed back into the debtor's negotiation history
    let history = f
        .stores
        .debtors
        .recent_negotiations(f.debtor_id, 5)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, ConversationStatus::Agreed);
    assert!(history[0]
        .debtor_messages
        .iter()
        .any(|m| m.contains("me parece bien")));
}

#[tokio::test]
async fn concurrent_turns_queue_per_conversation() {
    let f = fixture().await;
    let conversation = f
        .orchestrator
        .start_negotiation(f.proposal_id, f.debtor_id, Some(f.corporate_client_id))
        .await
        .unwrap();

    let a = {
        let orchestrator = f.orchestrator.clone();
        let id = conversation.id;
        tokio::spawn(
            async move { orchestrator.handle_debtor_message(id, "¿qué opciones tengo?").await },
        )
    };
    let b = {
        let orchestrator = f.orchestrator.clone();
        let id = conversation.id;
        tokio::spawn(async move {
            orchestrator
                .handle_debtor_message(id, "¿puedo pagar en cuotas?")
                .await
        })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a.is_ok());
    assert!(b.is_ok());

    // Both turns completed without racing: opening + 2×(inbound, reply)
    let messages = f.stores.messages.list(conversation.id).await.unwrap();
    assert_eq!(messages.len(), 5);

    let final_state = f
        .stores
        .conversations
        .get(conversation.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(final_state.message_count, 5);
}

#[tokio::test]
async fn unknown_conversation_is_an_error() {
    let f = fixture().await;
    let result = f
        .orchestrator
        .handle_debtor_message(Uuid::new_v4(), "hola")
        .await;
    assert!(matches!(result, Err(EngineError::ConversationNotFound(_))));
}

//! Conversation orchestrator
//!
//! Sequences one negotiation turn: persist the inbound message, resolve the
//! knowledge layers, analyze, evaluate escalation, generate or hand off,
//! persist the reply and advance the conversation state machine.
//!
//! Concurrency contract: a per-conversation async lock guarantees at most
//! one in-flight AI turn per conversation - a second inbound message queues
//! behind the first. Different conversations run fully in parallel.
//! Store failures retry up to the configured budget and then surface as
//! retryable errors; generation failures never surface (safety net).

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use negotiation_agent_analysis::MessageAnalyzer;
use negotiation_agent_analytics::{event_types, AnalyticsAggregator};
use negotiation_agent_config::EngineConfig;
use negotiation_agent_core::{
    AnalyticsEvent, Conversation, ConversationStatus, CorporateKnowledge, DebtorKnowledge,
    EscalationDecision, EscalationPriority, EscalationReason, Message, MessageMetadata,
    NegotiationContext, NegotiationOutcome, NegotiationSummary, SenderType,
};
use negotiation_agent_knowledge::{CorporateKnowledgeResolver, DebtorKnowledgeResolver};
use negotiation_agent_persistence::{PersistenceError, PersistenceLayer};
use uuid::Uuid;

use crate::escalation::EscalationEngine;
use crate::handoff::handoff_message;
use crate::response::ResponseGenerator;
use crate::EngineError;

/// Result of one processed debtor turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub conversation: Conversation,
    /// The AI reply that was persisted (handoff message when escalated)
    pub reply: Message,
    pub decision: EscalationDecision,
}

/// The negotiation orchestrator
pub struct NegotiationOrchestrator {
    stores: PersistenceLayer,
    analyzer: MessageAnalyzer,
    escalation: EscalationEngine,
    generator: ResponseGenerator,
    corporate_resolver: Arc<CorporateKnowledgeResolver>,
    debtor_resolver: DebtorKnowledgeResolver,
    analytics: Arc<AnalyticsAggregator>,
    config: EngineConfig,
    turn_locks: DashMap<Uuid, Arc<tokio::sync::Mutex<()>>>,
}

impl NegotiationOrchestrator {
    pub fn new(stores: PersistenceLayer, config: EngineConfig) -> Self {
        let corporate_resolver = Arc::new(CorporateKnowledgeResolver::new(
            stores.corporate.clone(),
            config.corporate_cache_ttl(),
        ));
        let debtor_resolver = DebtorKnowledgeResolver::new(stores.debtors.clone());
        let analytics = Arc::new(AnalyticsAggregator::new(
            stores.analytics.clone(),
            config.metrics_cache_ttl(),
        ));

        Self {
            stores,
            analyzer: MessageAnalyzer::new(),
            escalation: EscalationEngine::new(),
            generator: ResponseGenerator::new(),
            corporate_resolver,
            debtor_resolver,
            analytics,
            config,
            turn_locks: DashMap::new(),
        }
    }

    /// The corporate resolver, shared so policy writers can invalidate
    /// exactly the cache key they touch
    pub fn corporate_resolver(&self) -> Arc<CorporateKnowledgeResolver> {
        self.corporate_resolver.clone()
    }

    /// The analytics aggregator backing this orchestrator
    pub fn analytics(&self) -> Arc<AnalyticsAggregator> {
        self.analytics.clone()
    }

    /// Create a conversation for a proposal the debtor chose to negotiate
    ///
    /// Resolves the knowledge context, snapshots proposal figures and limits,
    /// and persists an AI-authored opening message summarizing the proposal.
    pub async fn start_negotiation(
        &self,
        proposal_id: Uuid,
        debtor_id: Uuid,
        corporate_client_id: Option<Uuid>,
    ) -> Result<Conversation, EngineError> {
        let proposal = self
            .with_retries(|| self.stores.proposals.get(proposal_id))
            .await?
            .ok_or(EngineError::ProposalNotFound(proposal_id))?;

        let corporate = self.resolve_corporate(corporate_client_id).await?;
        let debtor = self
            .debtor_resolver
            .resolve(debtor_id, corporate_client_id)
            .await?;

        let limits = corporate
            .as_ref()
            .map(|c| c.limits)
            .unwrap_or(self.config.default_limits);

        let context = NegotiationContext {
            total_amount: proposal.total_amount,
            installments: proposal.installments,
            installment_amount: proposal.installment_amount,
            limits,
        };

        let mut conversation = Conversation::new(
            proposal_id,
            debtor_id,
            proposal.company_id,
            corporate_client_id,
            context,
        );

        self.with_retries(|| self.stores.conversations.create(&conversation))
            .await?;

        let opening = Message::ai(conversation.id, opening_message(&conversation, &debtor, corporate.as_ref()));
        self.with_retries(|| self.stores.messages.append(&opening))
            .await?;
        conversation.message_count += 1;
        self.with_retries(|| self.stores.conversations.update(&conversation))
            .await?;

        self.analytics
            .track(
                AnalyticsEvent::new(conversation.company_id, event_types::NEGOTIATION_STARTED)
                    .with_proposal(proposal_id),
            )
            .await?;

        metrics::counter!("negotiation_conversations_started_total").increment(1);
        tracing::info!(
            conversation_id = %conversation.id,
            proposal_id = %proposal_id,
            debtor_id = %debtor_id,
            "Negotiation started"
        );

        Ok(conversation)
    }

    /// Process one inbound debtor message
    ///
    /// Serialized per conversation: a concurrent second message for the same
    /// conversation queues behind this one. Returns the persisted AI reply.
    pub async fn handle_debtor_message(
        &self,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let lock = self
            .turn_locks
            .entry(conversation_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        let _turn_guard = lock.lock().await;

        let mut conversation = self
            .with_retries(|| self.stores.conversations.get(conversation_id))
            .await?
            .ok_or(EngineError::ConversationNotFound(conversation_id))?;

        if !conversation.accepts_ai_turns() {
            return Err(EngineError::AiTurnsRejected(conversation_id));
        }
        if conversation.status == ConversationStatus::Active {
            conversation.transition_to(ConversationStatus::Negotiating)?;
        }

        let corporate = self
            .resolve_corporate(conversation.corporate_client_id)
            .await?;
        let debtor = self
            .debtor_resolver
            .resolve(conversation.debtor_id, conversation.corporate_client_id)
            .await?;

        // Fresh corporate limits win over the snapshot so a policy change
        // mid-conversation takes effect after its cache invalidation.
        let limits = corporate
            .as_ref()
            .map(|c| c.limits)
            .unwrap_or(conversation.negotiation_context.limits);

        // The decision sees the conversation as it stood when this message
        // arrived; this turn's appends have not been counted yet.
        let analysis = self.analyzer.analyze(content);
        let decision = self.escalation.decide_or_fail_closed(
            content,
            &analysis,
            &conversation,
            &limits,
            Some(&debtor),
        );

        let inbound = Message::debtor(conversation_id, content);
        self.with_retries(|| self.stores.messages.append(&inbound))
            .await?;
        conversation.message_count += 1;

        metrics::counter!("negotiation_turns_total").increment(1);

        if decision.should_escalate {
            let reason = decision.reason.unwrap_or(EscalationReason::TechnicalError);
            let reply = self
                .escalate(&mut conversation, reason, &analysis, &debtor, corporate.as_ref())
                .await?;
            return Ok(TurnOutcome {
                conversation,
                reply,
                decision,
            });
        }

        // Generation is bounded: on timeout the turn degrades to the
        // safety-net response instead of hanging the conversation.
        let response = match tokio::time::timeout(self.config.turn_timeout(), async {
            self.generator.generate(
                content,
                &analysis,
                &conversation.negotiation_context,
                &limits,
                Some(&debtor),
                corporate.as_ref(),
            )
        })
        .await
        {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(%conversation_id, "Response generation timed out");
                metrics::counter!("negotiation_fallbacks_total").increment(1);
                self.generator.fallback_response(&analysis)
            }
        };

        if response.escalation_triggered {
            // Safety-net path: the technical-error reply itself is the
            // handoff, and the conversation escalates.
            metrics::counter!("negotiation_fallbacks_total").increment(1);
            let reply = Message::ai(conversation_id, response.content.clone()).with_metadata(
                MessageMetadata {
                    analysis: Some(analysis.clone()),
                    confidence: Some(response.confidence),
                    response_type: Some(response.response_type),
                    personalization_level: Some(response.personalization_level),
                    escalation_triggered: true,
                    escalation_reason: response.escalation_reason,
                },
            );
            self.finish_escalation(&mut conversation, &reply).await?;
            return Ok(TurnOutcome {
                conversation,
                reply,
                decision: EscalationDecision::escalate(
                    response
                        .escalation_reason
                        .unwrap_or(EscalationReason::TechnicalError),
                    EscalationPriority::High,
                ),
            });
        }

        let reply = Message::ai(conversation_id, response.content.clone()).with_metadata(
            MessageMetadata {
                analysis: Some(analysis),
                confidence: Some(response.confidence),
                response_type: Some(response.response_type),
                personalization_level: Some(response.personalization_level),
                escalation_triggered: false,
                escalation_reason: None,
            },
        );
        self.with_retries(|| self.stores.messages.append(&reply))
            .await?;
        conversation.message_count += 1;
        conversation.updated_at = chrono::Utc::now();
        self.with_retries(|| self.stores.conversations.update(&conversation))
            .await?;

        tracing::info!(
            %conversation_id,
            response_type = response.response_type.as_str(),
            personalization = response.personalization_level.as_str(),
            "Turn completed"
        );

        Ok(TurnOutcome {
            conversation,
            reply,
            decision,
        })
    }

    /// Record a terminal outcome decided outside the AI loop
    /// (acceptance, rejection, or abandonment)
    pub async fn record_outcome(
        &self,
        conversation_id: Uuid,
        status: ConversationStatus,
    ) -> Result<Conversation, EngineError> {
        let mut conversation = self
            .with_retries(|| self.stores.conversations.get(conversation_id))
            .await?
            .ok_or(EngineError::ConversationNotFound(conversation_id))?;

        conversation.transition_to(status)?;
        conversation.ai_enabled = false;
        self.with_retries(|| self.stores.conversations.update(&conversation))
            .await?;

        let (event_type, outcome) = match status {
            ConversationStatus::Agreed => (
                event_types::NEGOTIATION_COMPLETED,
                Some(NegotiationOutcome::Agreement),
            ),
            ConversationStatus::Abandoned => (
                event_types::NEGOTIATION_ABANDONED,
                Some(NegotiationOutcome::Abandoned),
            ),
            // Rejection is terminal but carries no outcome bucket
            _ => (event_types::NEGOTIATION_REJECTED, None),
        };

        self.emit_terminal_event(&conversation, event_type, outcome)
            .await?;
        self.record_negotiation_summary(&conversation).await?;
        self.turn_locks.remove(&conversation_id);

        tracing::info!(%conversation_id, status = %status, "Outcome recorded");
        Ok(conversation)
    }

    /// Escalation path shared by the rule chain and the safety net
    async fn escalate(
        &self,
        conversation: &mut Conversation,
        reason: EscalationReason,
        analysis: &negotiation_agent_core::Analysis,
        debtor: &DebtorKnowledge,
        corporate: Option<&CorporateKnowledge>,
    ) -> Result<Message, EngineError> {
        let content = handoff_message(
            reason,
            debtor.personal.name.as_deref(),
            corporate.map(|c| c.profile.name.as_str()),
        );
        let reply = Message::ai(conversation.id, content).with_metadata(MessageMetadata {
            analysis: Some(analysis.clone()),
            confidence: None,
            response_type: None,
            personalization_level: None,
            escalation_triggered: true,
            escalation_reason: Some(reason),
        });

        self.finish_escalation(conversation, &reply).await?;
        Ok(reply)
    }

    /// Persist the handoff reply, flip the state machine and emit the event
    async fn finish_escalation(
        &self,
        conversation: &mut Conversation,
        reply: &Message,
    ) -> Result<(), EngineError> {
        self.with_retries(|| self.stores.messages.append(reply))
            .await?;
        conversation.message_count += 1;
        conversation.transition_to(ConversationStatus::Escalated)?;
        self.with_retries(|| self.stores.conversations.update(conversation))
            .await?;

        self.emit_terminal_event(
            conversation,
            event_types::NEGOTIATION_ESCALATED,
            Some(NegotiationOutcome::Escalated),
        )
        .await?;

        metrics::counter!("negotiation_escalations_total").increment(1);
        Ok(())
    }

    async fn emit_terminal_event(
        &self,
        conversation: &Conversation,
        event_type: &str,
        outcome: Option<NegotiationOutcome>,
    ) -> Result<(), EngineError> {
        let ai_messages = self
            .stores
            .messages
            .count_by_sender(conversation.id, SenderType::AiAssistant)
            .await?;

        let mut event = AnalyticsEvent::new(conversation.company_id, event_type)
            .with_proposal(conversation.proposal_id)
            .with_duration_minutes(conversation.duration_minutes())
            .with_ai_messages(ai_messages);
        event.outcome = outcome;

        self.analytics.track(event).await?;
        Ok(())
    }

    /// Feed this conversation back into the debtor's negotiation history
    async fn record_negotiation_summary(
        &self,
        conversation: &Conversation,
    ) -> Result<(), EngineError> {
        let messages = self
            .with_retries(|| self.stores.messages.list(conversation.id))
            .await?;
        let debtor_messages: Vec<String> = messages
            .iter()
            .filter(|m| m.sender == SenderType::Debtor)
            .map(|m| m.content.clone())
            .collect();

        let summary = NegotiationSummary {
            conversation_id: conversation.id,
            status: conversation.status,
            summary: format!(
                "Negociación sobre {:.2} finalizada como {}",
                conversation.negotiation_context.total_amount, conversation.status
            ),
            debtor_messages,
            created_at: chrono::Utc::now(),
        };

        self.with_retries(|| {
            self.stores.debtors.record_negotiation(
                conversation.debtor_id,
                conversation.corporate_client_id,
                &summary,
            )
        })
        .await?;
        Ok(())
    }

    async fn resolve_corporate(
        &self,
        corporate_client_id: Option<Uuid>,
    ) -> Result<Option<CorporateKnowledge>, EngineError> {
        match corporate_client_id {
            Some(id) => Ok(self.corporate_resolver.resolve(id).await?),
            None => Ok(None),
        }
    }

    /// Run a store operation, retrying transient failures up to the
    /// configured budget with linear backoff
    async fn with_retries<T, F, Fut>(&self, op: F) -> Result<T, PersistenceError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, PersistenceError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "Retrying store operation");
                    tokio::time::sleep(std::time::Duration::from_millis(100 * attempt as u64))
                        .await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// AI-authored opening message summarizing the proposal
fn opening_message(
    conversation: &Conversation,
    debtor: &DebtorKnowledge,
    corporate: Option<&CorporateKnowledge>,
) -> String {
    let context = &conversation.negotiation_context;
    let on_behalf = corporate
        .map(|c| format!(" en representación de {}", c.profile.name))
        .unwrap_or_default();

    format!(
        "Hola {}, le escribimos{} por su propuesta de pago: {:.2} en {} cuotas de {:.2}. \
         Podemos conversar sobre descuentos por pago anticipado, ajustes de cuotas o \
         extensiones de plazo. ¿Cómo le gustaría avanzar?",
        debtor.display_name(),
        on_behalf,
        context.total_amount,
        context.installments,
        context.installment_amount
    )
}

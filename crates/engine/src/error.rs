//! Engine error types

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the conversation orchestrator
///
/// Generation failures never appear here - they are absorbed into the
/// technical-error safety-net response. What does surface is retryable
/// store trouble and domain violations the caller must handle.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(Uuid),

    #[error("proposal not found: {0}")]
    ProposalNotFound(Uuid),

    #[error("conversation {0} does not accept AI turns")]
    AiTurnsRejected(Uuid),

    #[error(transparent)]
    Core(#[from] negotiation_agent_core::Error),

    #[error(transparent)]
    Knowledge(#[from] negotiation_agent_knowledge::KnowledgeError),

    #[error(transparent)]
    Persistence(#[from] negotiation_agent_persistence::PersistenceError),
}

impl From<negotiation_agent_analytics::AnalyticsError> for EngineError {
    fn from(e: negotiation_agent_analytics::AnalyticsError) -> Self {
        match e {
            negotiation_agent_analytics::AnalyticsError::Persistence(e) => Self::Persistence(e),
        }
    }
}

impl EngineError {
    /// Whether the caller may retry the whole operation
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(e) => e.is_retryable(),
            Self::Knowledge(e) => e.is_retryable(),
            _ => false,
        }
    }
}

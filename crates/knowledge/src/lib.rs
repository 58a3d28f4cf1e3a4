//! Layered knowledge-base resolution for the negotiation agent
//!
//! Two resolvers merge the persisted layers into read-only context objects
//! consumed per conversation turn:
//! - [`CorporateKnowledgeResolver`] - profile + policies + templates +
//!   limits, cached with a TTL and explicit per-key invalidation
//! - [`DebtorKnowledgeResolver`] - debt + history + derived behavior
//!   profile, recomputed on every call

pub mod corporate;
pub mod debtor;

pub use corporate::CorporateKnowledgeResolver;
pub use debtor::DebtorKnowledgeResolver;

use thiserror::Error;

/// Errors from knowledge resolution. Absent records are not errors - they
/// degrade to defaults; only the store itself can fail.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("persistence error: {0}")]
    Persistence(#[from] negotiation_agent_persistence::PersistenceError),
}

impl KnowledgeError {
    /// Whether retrying the resolution can plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Persistence(e) => e.is_retryable(),
        }
    }
}

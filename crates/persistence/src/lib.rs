//! Store traits and ScyllaDB persistence for the negotiation agent
//!
//! Provides persistent storage for:
//! - Conversations and their append-only message logs
//! - Proposals (read-only to the core)
//! - Debtor records (debt, payments, prior negotiations)
//! - Corporate client records (profile, policies, templates, AI config)
//! - Analytics events (append-only)
//!
//! Every aggregate is reached through a trait with two implementations: a
//! ScyllaDB store and an in-memory store used when persistence is disabled
//! and in tests. The stores are the single source of truth; the knowledge
//! and metrics caches upstream are performance optimizations only.

pub mod analytics;
pub mod client;
pub mod conversations;
pub mod corporate;
pub mod debtors;
pub mod error;
pub mod messages;
pub mod proposals;
pub mod schema;

pub use analytics::{AnalyticsEventStore, InMemoryAnalyticsEventStore, ScyllaAnalyticsEventStore};
pub use client::{ScyllaClient, ScyllaConfig};
pub use conversations::{ConversationStore, InMemoryConversationStore, ScyllaConversationStore};
pub use corporate::{CorporateStore, InMemoryCorporateStore, ScyllaCorporateStore};
pub use debtors::{DebtorStore, InMemoryDebtorStore, ScyllaDebtorStore};
pub use error::PersistenceError;
pub use messages::{InMemoryMessageStore, MessageStore, ScyllaMessageStore};
pub use proposals::{InMemoryProposalStore, ProposalStore, ScyllaProposalStore};

use std::sync::Arc;

/// Combined persistence layer with all stores
#[derive(Clone)]
pub struct PersistenceLayer {
    pub conversations: Arc<dyn ConversationStore>,
    pub messages: Arc<dyn MessageStore>,
    pub proposals: Arc<dyn ProposalStore>,
    pub debtors: Arc<dyn DebtorStore>,
    pub corporate: Arc<dyn CorporateStore>,
    pub analytics: Arc<dyn AnalyticsEventStore>,
}

impl PersistenceLayer {
    /// In-memory layer for development and tests
    pub fn in_memory() -> Self {
        Self {
            conversations: Arc::new(InMemoryConversationStore::new()),
            messages: Arc::new(InMemoryMessageStore::new()),
            proposals: Arc::new(InMemoryProposalStore::new()),
            debtors: Arc::new(InMemoryDebtorStore::new()),
            corporate: Arc::new(InMemoryCorporateStore::new()),
            analytics: Arc::new(InMemoryAnalyticsEventStore::new()),
        }
    }
}

/// Initialize the ScyllaDB persistence layer
pub async fn init(config: ScyllaConfig) -> Result<PersistenceLayer, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;

    Ok(PersistenceLayer {
        conversations: Arc::new(ScyllaConversationStore::new(client.clone())),
        messages: Arc::new(ScyllaMessageStore::new(client.clone())),
        proposals: Arc::new(ScyllaProposalStore::new(client.clone())),
        debtors: Arc::new(ScyllaDebtorStore::new(client.clone())),
        corporate: Arc::new(ScyllaCorporateStore::new(client.clone())),
        analytics: Arc::new(ScyllaAnalyticsEventStore::new(client)),
    })
}

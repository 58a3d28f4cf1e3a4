//! Proposal persistence
//!
//! The negotiation core only reads proposals; the upsert path exists for
//! the marketplace host and for test fixtures.

use async_trait::async_trait;
use negotiation_agent_core::{Proposal, ProposalStatus};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

/// Proposal store trait
#[async_trait]
pub trait ProposalStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Proposal>, PersistenceError>;
    async fn upsert(&self, proposal: &Proposal) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of proposal store
#[derive(Clone)]
pub struct ScyllaProposalStore {
    client: ScyllaClient,
}

impl ScyllaProposalStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProposalStore for ScyllaProposalStore {
    async fn get(&self, id: Uuid) -> Result<Option<Proposal>, PersistenceError> {
        let query = format!(
            "SELECT id, company_id, total_amount, installments, installment_amount, status
             FROM {}.proposals WHERE id = ?",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, (id,)).await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (id, company_id, total_amount, installments, installment_amount, status): (
                    Uuid,
                    Uuid,
                    f64,
                    i32,
                    f64,
                    String,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(Proposal {
                    id,
                    company_id,
                    total_amount,
                    installments: installments.max(0) as u32,
                    installment_amount,
                    status: ProposalStatus::parse(&status),
                }));
            }
        }

        Ok(None)
    }

    async fn upsert(&self, proposal: &Proposal) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.proposals (
                id, company_id, total_amount, installments, installment_amount, status
            ) VALUES (?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    proposal.id,
                    proposal.company_id,
                    proposal.total_amount,
                    proposal.installments as i32,
                    proposal.installment_amount,
                    proposal.status.as_str(),
                ),
            )
            .await?;

        Ok(())
    }
}

/// In-memory proposal store for development and tests
#[derive(Default)]
pub struct InMemoryProposalStore {
    proposals: RwLock<HashMap<Uuid, Proposal>>,
}

impl InMemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProposalStore for InMemoryProposalStore {
    async fn get(&self, id: Uuid) -> Result<Option<Proposal>, PersistenceError> {
        Ok(self.proposals.read().get(&id).cloned())
    }

    async fn upsert(&self, proposal: &Proposal) -> Result<(), PersistenceError> {
        self.proposals.write().insert(proposal.id, proposal.clone());
        Ok(())
    }
}

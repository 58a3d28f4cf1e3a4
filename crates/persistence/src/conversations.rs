//! Conversation persistence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use negotiation_agent_core::{Conversation, ConversationStatus, NegotiationContext};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

/// Conversation store trait
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create(&self, conversation: &Conversation) -> Result<(), PersistenceError>;
    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, PersistenceError>;
    /// Persist status, ai_enabled, message_count and updated_at
    async fn update(&self, conversation: &Conversation) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of conversation store
#[derive(Clone)]
pub struct ScyllaConversationStore {
    client: ScyllaClient,
}

impl ScyllaConversationStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_conversation(
        &self,
        row: scylla::frame::response::result::Row,
    ) -> Result<Conversation, PersistenceError> {
        let (
            id,
            proposal_id,
            debtor_id,
            company_id,
            corporate_client_id,
            status,
            ai_enabled,
            message_count,
            negotiation_context_json,
            created_at,
            updated_at,
        ): (
            Uuid,
            Uuid,
            Uuid,
            Uuid,
            Option<Uuid>,
            String,
            bool,
            i32,
            String,
            i64,
            i64,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let negotiation_context: NegotiationContext =
            serde_json::from_str(&negotiation_context_json)?;

        Ok(Conversation {
            id,
            proposal_id,
            debtor_id,
            company_id,
            corporate_client_id,
            status: ConversationStatus::parse(&status),
            ai_enabled,
            message_count: message_count.max(0) as u32,
            negotiation_context,
            created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp_millis(updated_at).unwrap_or_else(Utc::now),
        })
    }
}

#[async_trait]
impl ConversationStore for ScyllaConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.conversations (
                id, proposal_id, debtor_id, company_id, corporate_client_id,
                status, ai_enabled, message_count, negotiation_context_json,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    conversation.id,
                    conversation.proposal_id,
                    conversation.debtor_id,
                    conversation.company_id,
                    conversation.corporate_client_id,
                    conversation.status.as_str(),
                    conversation.ai_enabled,
                    conversation.message_count as i32,
                    serde_json::to_string(&conversation.negotiation_context)?,
                    conversation.created_at.timestamp_millis(),
                    conversation.updated_at.timestamp_millis(),
                ),
            )
            .await?;

        tracing::info!(
            conversation_id = %conversation.id,
            proposal_id = %conversation.proposal_id,
            "Conversation created in ScyllaDB"
        );

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, PersistenceError> {
        let query = format!(
            "SELECT id, proposal_id, debtor_id, company_id, corporate_client_id,
                    status, ai_enabled, message_count, negotiation_context_json,
                    created_at, updated_at
             FROM {}.conversations WHERE id = ?",
            self.client.keyspace()
        );

        let result = self.client.session().query_unpaged(query, (id,)).await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                return Ok(Some(self.row_to_conversation(row)?));
            }
        }

        Ok(None)
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.conversations
             SET status = ?, ai_enabled = ?, message_count = ?, updated_at = ?
             WHERE id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    conversation.status.as_str(),
                    conversation.ai_enabled,
                    conversation.message_count as i32,
                    conversation.updated_at.timestamp_millis(),
                    conversation.id,
                ),
            )
            .await?;

        Ok(())
    }
}

/// In-memory conversation store for development and tests
#[derive(Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<Uuid, Conversation>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self, conversation: &Conversation) -> Result<(), PersistenceError> {
        self.conversations
            .write()
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, PersistenceError> {
        Ok(self.conversations.read().get(&id).cloned())
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), PersistenceError> {
        let mut conversations = self.conversations.write();
        if !conversations.contains_key(&conversation.id) {
            return Err(PersistenceError::NotFound {
                entity: "conversation",
                id: conversation.id.to_string(),
            });
        }
        conversations.insert(conversation.id, conversation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use negotiation_agent_core::NegotiationLimits;

    fn conversation() -> Conversation {
        Conversation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            NegotiationContext {
                total_amount: 50_000.0,
                installments: 10,
                installment_amount: 5_000.0,
                limits: NegotiationLimits::default(),
            },
        )
    }

    #[tokio::test]
    async fn in_memory_round_trip() {
        let store = InMemoryConversationStore::new();
        let conv = conversation();
        store.create(&conv).await.unwrap();

        let loaded = store.get(conv.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, ConversationStatus::Negotiating);
        assert!(loaded.ai_enabled);
    }

    #[tokio::test]
    async fn update_requires_existing() {
        let store = InMemoryConversationStore::new();
        let conv = conversation();
        assert!(store.update(&conv).await.is_err());
    }
}

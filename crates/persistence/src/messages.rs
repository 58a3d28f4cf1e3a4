//! Message persistence
//!
//! Messages are an append-only log: there is no update or delete path, and
//! listing returns arrival order within a conversation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use negotiation_agent_core::{Message, MessageMetadata, SenderType};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

/// Message store trait
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append one message. Never overwrites.
    async fn append(&self, message: &Message) -> Result<(), PersistenceError>;

    /// All messages of a conversation in arrival order
    async fn list(&self, conversation_id: Uuid) -> Result<Vec<Message>, PersistenceError>;

    /// Count of messages authored by the given sender
    async fn count_by_sender(
        &self,
        conversation_id: Uuid,
        sender: SenderType,
    ) -> Result<u32, PersistenceError> {
        let messages = self.list(conversation_id).await?;
        Ok(messages.iter().filter(|m| m.sender == sender).count() as u32)
    }
}

/// ScyllaDB implementation of message store
#[derive(Clone)]
pub struct ScyllaMessageStore {
    client: ScyllaClient,
}

impl ScyllaMessageStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    fn row_to_message(
        &self,
        row: scylla::frame::response::result::Row,
    ) -> Result<Message, PersistenceError> {
        let (conversation_id, created_at, id, sender, content, metadata_json): (
            Uuid,
            i64,
            Uuid,
            String,
            String,
            String,
        ) = row
            .into_typed()
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let metadata: MessageMetadata = serde_json::from_str(&metadata_json)?;

        Ok(Message {
            id,
            conversation_id,
            sender: SenderType::parse(&sender),
            content,
            metadata,
            created_at: DateTime::from_timestamp_millis(created_at).unwrap_or_else(Utc::now),
        })
    }
}

#[async_trait]
impl MessageStore for ScyllaMessageStore {
    async fn append(&self, message: &Message) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.messages (
                conversation_id, created_at, id, sender, content, metadata_json
            ) VALUES (?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    message.conversation_id,
                    message.created_at.timestamp_millis(),
                    message.id,
                    message.sender.as_str(),
                    &message.content,
                    serde_json::to_string(&message.metadata)?,
                ),
            )
            .await?;

        tracing::debug!(
            conversation_id = %message.conversation_id,
            sender = %message.sender,
            "Message appended"
        );

        Ok(())
    }

    async fn list(&self, conversation_id: Uuid) -> Result<Vec<Message>, PersistenceError> {
        let query = format!(
            "SELECT conversation_id, created_at, id, sender, content, metadata_json
             FROM {}.messages WHERE conversation_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (conversation_id,))
            .await?;

        let mut messages = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                messages.push(self.row_to_message(row)?);
            }
        }

        Ok(messages)
    }
}

/// In-memory message store for development and tests
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: RwLock<HashMap<Uuid, Vec<Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, message: &Message) -> Result<(), PersistenceError> {
        self.messages
            .write()
            .entry(message.conversation_id)
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn list(&self, conversation_id: Uuid) -> Result<Vec<Message>, PersistenceError> {
        Ok(self
            .messages
            .read()
            .get(&conversation_id)
            .cloned()
            .unwrap_or_default())
    }
}

//! Analytics event persistence
//!
//! Append-only: events are inserted and listed, never mutated or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use negotiation_agent_core::{AnalyticsEvent, NegotiationOutcome};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

/// Analytics event store trait
#[async_trait]
pub trait AnalyticsEventStore: Send + Sync {
    async fn append(&self, event: &AnalyticsEvent) -> Result<(), PersistenceError>;
    /// All events for a company, newest first
    async fn list_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<AnalyticsEvent>, PersistenceError>;
}

/// ScyllaDB implementation of analytics event store
#[derive(Clone)]
pub struct ScyllaAnalyticsEventStore {
    client: ScyllaClient,
}

impl ScyllaAnalyticsEventStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalyticsEventStore for ScyllaAnalyticsEventStore {
    async fn append(&self, event: &AnalyticsEvent) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.analytics_events (
                company_id, created_at, id, proposal_id, event_type, outcome,
                conversation_duration_minutes, ai_messages
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    event.company_id,
                    event.created_at.timestamp_millis(),
                    event.id,
                    event.proposal_id,
                    &event.event_type,
                    event.outcome.map(|o| o.as_str()),
                    event.conversation_duration_minutes,
                    event.ai_messages as i32,
                ),
            )
            .await?;

        tracing::debug!(
            company_id = %event.company_id,
            event_type = %event.event_type,
            "Analytics event appended"
        );

        Ok(())
    }

    async fn list_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<AnalyticsEvent>, PersistenceError> {
        let query = format!(
            "SELECT company_id, created_at, id, proposal_id, event_type, outcome,
                    conversation_duration_minutes, ai_messages
             FROM {}.analytics_events WHERE company_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (company_id,))
            .await?;

        let mut events = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (
                    company_id,
                    created_at,
                    id,
                    proposal_id,
                    event_type,
                    outcome,
                    conversation_duration_minutes,
                    ai_messages,
                ): (
                    Uuid,
                    i64,
                    Uuid,
                    Option<Uuid>,
                    String,
                    Option<String>,
                    i64,
                    i32,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                events.push(AnalyticsEvent {
                    id,
                    company_id,
                    proposal_id,
                    event_type,
                    outcome: outcome.as_deref().and_then(NegotiationOutcome::parse),
                    conversation_duration_minutes,
                    ai_messages: ai_messages.max(0) as u32,
                    created_at: DateTime::from_timestamp_millis(created_at)
                        .unwrap_or_else(Utc::now),
                });
            }
        }

        Ok(events)
    }
}

/// In-memory analytics event store for development and tests
#[derive(Default)]
pub struct InMemoryAnalyticsEventStore {
    events: RwLock<HashMap<Uuid, Vec<AnalyticsEvent>>>,
}

impl InMemoryAnalyticsEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalyticsEventStore for InMemoryAnalyticsEventStore {
    async fn append(&self, event: &AnalyticsEvent) -> Result<(), PersistenceError> {
        self.events
            .write()
            .entry(event.company_id)
            .or_default()
            .insert(0, event.clone());
        Ok(())
    }

    async fn list_for_company(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<AnalyticsEvent>, PersistenceError> {
        Ok(self
            .events
            .read()
            .get(&company_id)
            .cloned()
            .unwrap_or_default())
    }
}

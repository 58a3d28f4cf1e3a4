//! Debtor record persistence
//!
//! Debt, payment history and prior negotiation summaries per debtor. The
//! knowledge resolver reads bounded recent windows (payments and summaries
//! are clustered newest-first), so the read paths take an explicit limit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use negotiation_agent_core::{
    ContactMethod, ConversationStatus, DebtInfo, DebtorInfo, NegotiationSummary, PaymentRecord,
};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

/// Debtor store trait
#[async_trait]
pub trait DebtorStore: Send + Sync {
    async fn debtor_info(&self, debtor_id: Uuid) -> Result<Option<DebtorInfo>, PersistenceError>;
    async fn debt_info(&self, debtor_id: Uuid) -> Result<Option<DebtInfo>, PersistenceError>;
    /// Most recent negotiation summaries, newest first
    async fn recent_negotiations(
        &self,
        debtor_id: Uuid,
        limit: usize,
    ) -> Result<Vec<NegotiationSummary>, PersistenceError>;
    /// Most recent payments, newest first
    async fn recent_payments(
        &self,
        debtor_id: Uuid,
        limit: usize,
    ) -> Result<Vec<PaymentRecord>, PersistenceError>;

    async fn upsert_debtor(&self, info: &DebtorInfo) -> Result<(), PersistenceError>;
    async fn upsert_debt(&self, debtor_id: Uuid, debt: &DebtInfo) -> Result<(), PersistenceError>;
    async fn record_payment(
        &self,
        debtor_id: Uuid,
        payment: &PaymentRecord,
    ) -> Result<(), PersistenceError>;
    async fn record_negotiation(
        &self,
        debtor_id: Uuid,
        corporate_client_id: Option<Uuid>,
        summary: &NegotiationSummary,
    ) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of debtor store
#[derive(Clone)]
pub struct ScyllaDebtorStore {
    client: ScyllaClient,
}

impl ScyllaDebtorStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DebtorStore for ScyllaDebtorStore {
    async fn debtor_info(&self, debtor_id: Uuid) -> Result<Option<DebtorInfo>, PersistenceError> {
        let query = format!(
            "SELECT id, name, email, phone, preferred_contact_method
             FROM {}.debtors WHERE id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (debtor_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (id, name, email, phone, preferred_contact_method): (
                    Uuid,
                    Option<String>,
                    Option<String>,
                    Option<String>,
                    Option<String>,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(DebtorInfo {
                    id,
                    name,
                    email,
                    phone,
                    preferred_contact_method: preferred_contact_method
                        .as_deref()
                        .and_then(ContactMethod::parse),
                }));
            }
        }

        Ok(None)
    }

    async fn debt_info(&self, debtor_id: Uuid) -> Result<Option<DebtInfo>, PersistenceError> {
        let query = format!(
            "SELECT amount, days_overdue FROM {}.debts WHERE debtor_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (debtor_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (amount, days_overdue): (f64, i32) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(DebtInfo {
                    amount,
                    days_overdue: days_overdue.max(0) as u32,
                }));
            }
        }

        Ok(None)
    }

    async fn recent_negotiations(
        &self,
        debtor_id: Uuid,
        limit: usize,
    ) -> Result<Vec<NegotiationSummary>, PersistenceError> {
        let query = format!(
            "SELECT conversation_id, status, summary, debtor_messages_json, created_at
             FROM {}.negotiation_summaries WHERE debtor_id = ? LIMIT ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (debtor_id, limit as i32))
            .await?;

        let mut summaries = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (conversation_id, status, summary, debtor_messages_json, created_at): (
                    Uuid,
                    String,
                    String,
                    String,
                    i64,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                summaries.push(NegotiationSummary {
                    conversation_id,
                    status: ConversationStatus::parse(&status),
                    summary,
                    debtor_messages: serde_json::from_str(&debtor_messages_json)?,
                    created_at: DateTime::from_timestamp_millis(created_at)
                        .unwrap_or_else(Utc::now),
                });
            }
        }

        Ok(summaries)
    }

    async fn recent_payments(
        &self,
        debtor_id: Uuid,
        limit: usize,
    ) -> Result<Vec<PaymentRecord>, PersistenceError> {
        let query = format!(
            "SELECT amount, due_date, paid_at, on_time
             FROM {}.payments WHERE debtor_id = ? LIMIT ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (debtor_id, limit as i32))
            .await?;

        let mut payments = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (amount, due_date, paid_at, on_time): (f64, i64, Option<i64>, bool) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                payments.push(PaymentRecord {
                    amount,
                    due_date: DateTime::from_timestamp_millis(due_date).unwrap_or_else(Utc::now),
                    paid_at: paid_at.and_then(DateTime::from_timestamp_millis),
                    on_time,
                });
            }
        }

        Ok(payments)
    }

    async fn upsert_debtor(&self, info: &DebtorInfo) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.debtors (id, name, email, phone, preferred_contact_method)
             VALUES (?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    info.id,
                    &info.name,
                    &info.email,
                    &info.phone,
                    info.preferred_contact_method.map(|m| m.as_str()),
                ),
            )
            .await?;

        Ok(())
    }

    async fn upsert_debt(&self, debtor_id: Uuid, debt: &DebtInfo) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.debts (debtor_id, amount, days_overdue) VALUES (?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (debtor_id, debt.amount, debt.days_overdue as i32))
            .await?;

        Ok(())
    }

    async fn record_payment(
        &self,
        debtor_id: Uuid,
        payment: &PaymentRecord,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.payments (debtor_id, due_date, id, amount, paid_at, on_time)
             VALUES (?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    debtor_id,
                    payment.due_date.timestamp_millis(),
                    Uuid::new_v4(),
                    payment.amount,
                    payment.paid_at.map(|t| t.timestamp_millis()),
                    payment.on_time,
                ),
            )
            .await?;

        Ok(())
    }

    async fn record_negotiation(
        &self,
        debtor_id: Uuid,
        corporate_client_id: Option<Uuid>,
        summary: &NegotiationSummary,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.negotiation_summaries (
                debtor_id, created_at, conversation_id, corporate_client_id,
                status, summary, debtor_messages_json
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    debtor_id,
                    summary.created_at.timestamp_millis(),
                    summary.conversation_id,
                    corporate_client_id,
                    summary.status.as_str(),
                    &summary.summary,
                    serde_json::to_string(&summary.debtor_messages)?,
                ),
            )
            .await?;

        Ok(())
    }
}

#[derive(Default)]
struct DebtorRecords {
    info: Option<DebtorInfo>,
    debt: Option<DebtInfo>,
    /// Newest first
    negotiations: Vec<NegotiationSummary>,
    /// Newest first
    payments: Vec<PaymentRecord>,
}

/// In-memory debtor store for development and tests
#[derive(Default)]
pub struct InMemoryDebtorStore {
    records: RwLock<HashMap<Uuid, DebtorRecords>>,
}

impl InMemoryDebtorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DebtorStore for InMemoryDebtorStore {
    async fn debtor_info(&self, debtor_id: Uuid) -> Result<Option<DebtorInfo>, PersistenceError> {
        Ok(self
            .records
            .read()
            .get(&debtor_id)
            .and_then(|r| r.info.clone()))
    }

    async fn debt_info(&self, debtor_id: Uuid) -> Result<Option<DebtInfo>, PersistenceError> {
        Ok(self.records.read().get(&debtor_id).and_then(|r| r.debt))
    }

    async fn recent_negotiations(
        &self,
        debtor_id: Uuid,
        limit: usize,
    ) -> Result<Vec<NegotiationSummary>, PersistenceError> {
        Ok(self
            .records
            .read()
            .get(&debtor_id)
            .map(|r| r.negotiations.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn recent_payments(
        &self,
        debtor_id: Uuid,
        limit: usize,
    ) -> Result<Vec<PaymentRecord>, PersistenceError> {
        Ok(self
            .records
            .read()
            .get(&debtor_id)
            .map(|r| r.payments.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_debtor(&self, info: &DebtorInfo) -> Result<(), PersistenceError> {
        self.records.write().entry(info.id).or_default().info = Some(info.clone());
        Ok(())
    }

    async fn upsert_debt(&self, debtor_id: Uuid, debt: &DebtInfo) -> Result<(), PersistenceError> {
        self.records.write().entry(debtor_id).or_default().debt = Some(*debt);
        Ok(())
    }

    async fn record_payment(
        &self,
        debtor_id: Uuid,
        payment: &PaymentRecord,
    ) -> Result<(), PersistenceError> {
        self.records
            .write()
            .entry(debtor_id)
            .or_default()
            .payments
            .insert(0, payment.clone());
        Ok(())
    }

    async fn record_negotiation(
        &self,
        debtor_id: Uuid,
        _corporate_client_id: Option<Uuid>,
        summary: &NegotiationSummary,
    ) -> Result<(), PersistenceError> {
        self.records
            .write()
            .entry(debtor_id)
            .or_default()
            .negotiations
            .insert(0, summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn history_windows_respect_limits() {
        let store = InMemoryDebtorStore::new();
        let debtor_id = Uuid::new_v4();

        for i in 0..12 {
            store
                .record_payment(
                    debtor_id,
                    &PaymentRecord {
                        amount: 100.0 + i as f64,
                        due_date: Utc::now(),
                        paid_at: Some(Utc::now()),
                        on_time: true,
                    },
                )
                .await
                .unwrap();
        }

        let payments = store.recent_payments(debtor_id, 10).await.unwrap();
        assert_eq!(payments.len(), 10);
        // Newest first
        assert_eq!(payments[0].amount, 111.0);
    }

    #[tokio::test]
    async fn missing_debtor_is_modeled_absence() {
        let store = InMemoryDebtorStore::new();
        assert!(store.debtor_info(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store
            .recent_negotiations(Uuid::new_v4(), 5)
            .await
            .unwrap()
            .is_empty());
    }
}

//! Corporate client persistence
//!
//! Profiles, policy documents, custom response templates and AI config per
//! corporate client. Reads back only active policies/templates; the write
//! paths are what the knowledge cache invalidation hooks into.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use negotiation_agent_core::{AiConfig, CorporatePolicy, CorporateProfile, ResponseTemplate};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

/// Corporate store trait
#[async_trait]
pub trait CorporateStore: Send + Sync {
    async fn profile(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Option<CorporateProfile>, PersistenceError>;
    /// Active policies only
    async fn active_policies(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Vec<CorporatePolicy>, PersistenceError>;
    /// Active custom response templates only
    async fn active_templates(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Vec<ResponseTemplate>, PersistenceError>;
    /// AI config; `None` means the documented defaults apply
    async fn ai_config(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Option<AiConfig>, PersistenceError>;

    async fn upsert_profile(&self, profile: &CorporateProfile) -> Result<(), PersistenceError>;
    async fn upsert_policy(&self, policy: &CorporatePolicy) -> Result<(), PersistenceError>;
    async fn upsert_template(&self, template: &ResponseTemplate) -> Result<(), PersistenceError>;
    async fn set_ai_config(
        &self,
        corporate_client_id: Uuid,
        config: &AiConfig,
    ) -> Result<(), PersistenceError>;
}

/// ScyllaDB implementation of corporate store
#[derive(Clone)]
pub struct ScyllaCorporateStore {
    client: ScyllaClient,
}

impl ScyllaCorporateStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CorporateStore for ScyllaCorporateStore {
    async fn profile(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Option<CorporateProfile>, PersistenceError> {
        let query = format!(
            "SELECT id, name, description, industry FROM {}.corporate_profiles WHERE id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (corporate_client_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (id, name, description, industry): (
                    Uuid,
                    String,
                    Option<String>,
                    Option<String>,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(CorporateProfile {
                    id,
                    name,
                    description,
                    industry,
                }));
            }
        }

        Ok(None)
    }

    async fn active_policies(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Vec<CorporatePolicy>, PersistenceError> {
        let query = format!(
            "SELECT id, title, content, active, updated_at
             FROM {}.corporate_policies WHERE corporate_client_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (corporate_client_id,))
            .await?;

        let mut policies = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (id, title, content, active, updated_at): (Uuid, String, String, bool, i64) =
                    row.into_typed()
                        .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                if active {
                    policies.push(CorporatePolicy {
                        id,
                        corporate_client_id,
                        title,
                        content,
                        active,
                        updated_at: DateTime::from_timestamp_millis(updated_at)
                            .unwrap_or_else(Utc::now),
                    });
                }
            }
        }

        Ok(policies)
    }

    async fn active_templates(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Vec<ResponseTemplate>, PersistenceError> {
        let query = format!(
            "SELECT id, trigger, content, active
             FROM {}.response_templates WHERE corporate_client_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (corporate_client_id,))
            .await?;

        let mut templates = Vec::new();
        if let Some(rows) = result.rows {
            for row in rows {
                let (id, trigger, content, active): (Uuid, String, String, bool) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                if active {
                    templates.push(ResponseTemplate {
                        id,
                        corporate_client_id,
                        trigger,
                        content,
                        active,
                    });
                }
            }
        }

        Ok(templates)
    }

    async fn ai_config(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Option<AiConfig>, PersistenceError> {
        let query = format!(
            "SELECT config_json FROM {}.ai_configs WHERE corporate_client_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (corporate_client_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (config_json,): (String,) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(serde_json::from_str(&config_json)?));
            }
        }

        Ok(None)
    }

    async fn upsert_profile(&self, profile: &CorporateProfile) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.corporate_profiles (id, name, description, industry)
             VALUES (?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    profile.id,
                    &profile.name,
                    &profile.description,
                    &profile.industry,
                ),
            )
            .await?;

        Ok(())
    }

    async fn upsert_policy(&self, policy: &CorporatePolicy) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.corporate_policies (
                corporate_client_id, id, title, content, active, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    policy.corporate_client_id,
                    policy.id,
                    &policy.title,
                    &policy.content,
                    policy.active,
                    policy.updated_at.timestamp_millis(),
                ),
            )
            .await?;

        Ok(())
    }

    async fn upsert_template(&self, template: &ResponseTemplate) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.response_templates (
                corporate_client_id, id, trigger, content, active
            ) VALUES (?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    template.corporate_client_id,
                    template.id,
                    &template.trigger,
                    &template.content,
                    template.active,
                ),
            )
            .await?;

        Ok(())
    }

    async fn set_ai_config(
        &self,
        corporate_client_id: Uuid,
        config: &AiConfig,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.ai_configs (corporate_client_id, config_json) VALUES (?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (corporate_client_id, serde_json::to_string(config)?))
            .await?;

        Ok(())
    }
}

#[derive(Default)]
struct CorporateRecords {
    profile: Option<CorporateProfile>,
    policies: Vec<CorporatePolicy>,
    templates: Vec<ResponseTemplate>,
    ai_config: Option<AiConfig>,
}

/// In-memory corporate store for development and tests
#[derive(Default)]
pub struct InMemoryCorporateStore {
    records: RwLock<HashMap<Uuid, CorporateRecords>>,
}

impl InMemoryCorporateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CorporateStore for InMemoryCorporateStore {
    async fn profile(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Option<CorporateProfile>, PersistenceError> {
        Ok(self
            .records
            .read()
            .get(&corporate_client_id)
            .and_then(|r| r.profile.clone()))
    }

    async fn active_policies(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Vec<CorporatePolicy>, PersistenceError> {
        Ok(self
            .records
            .read()
            .get(&corporate_client_id)
            .map(|r| r.policies.iter().filter(|p| p.active).cloned().collect())
            .unwrap_or_default())
    }

    async fn active_templates(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Vec<ResponseTemplate>, PersistenceError> {
        Ok(self
            .records
            .read()
            .get(&corporate_client_id)
            .map(|r| r.templates.iter().filter(|t| t.active).cloned().collect())
            .unwrap_or_default())
    }

    async fn ai_config(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Option<AiConfig>, PersistenceError> {
        Ok(self
            .records
            .read()
            .get(&corporate_client_id)
            .and_then(|r| r.ai_config.clone()))
    }

    async fn upsert_profile(&self, profile: &CorporateProfile) -> Result<(), PersistenceError> {
        self.records
            .write()
            .entry(profile.id)
            .or_default()
            .profile = Some(profile.clone());
        Ok(())
    }

    async fn upsert_policy(&self, policy: &CorporatePolicy) -> Result<(), PersistenceError> {
        let mut records = self.records.write();
        let entry = records.entry(policy.corporate_client_id).or_default();
        entry.policies.retain(|p| p.id != policy.id);
        entry.policies.push(policy.clone());
        Ok(())
    }

    async fn upsert_template(&self, template: &ResponseTemplate) -> Result<(), PersistenceError> {
        let mut records = self.records.write();
        let entry = records.entry(template.corporate_client_id).or_default();
        entry.templates.retain(|t| t.id != template.id);
        entry.templates.push(template.clone());
        Ok(())
    }

    async fn set_ai_config(
        &self,
        corporate_client_id: Uuid,
        config: &AiConfig,
    ) -> Result<(), PersistenceError> {
        self.records
            .write()
            .entry(corporate_client_id)
            .or_default()
            .ai_config = Some(config.clone());
        Ok(())
    }
}

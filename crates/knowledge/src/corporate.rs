//! Corporate knowledge resolution
//!
//! Merges a corporate client's profile, active policies, active response
//! templates and AI config into one read-only context object. Results are
//! cached for the configured TTL; every write path offered here invalidates
//! exactly the key it touched, so concurrent negotiations for other clients
//! never see a flush.

use std::sync::Arc;
use std::time::Duration;

use negotiation_agent_core::{
    AiConfig, CorporateKnowledge, CorporatePolicy, ResponseTemplate, TtlCache,
};
use negotiation_agent_persistence::CorporateStore;
use uuid::Uuid;

use crate::KnowledgeError;

/// Resolver for the corporate knowledge layer
pub struct CorporateKnowledgeResolver {
    store: Arc<dyn CorporateStore>,
    cache: TtlCache<Uuid, CorporateKnowledge>,
}

impl CorporateKnowledgeResolver {
    pub fn new(store: Arc<dyn CorporateStore>, cache_ttl: Duration) -> Self {
        Self {
            store,
            cache: TtlCache::new(cache_ttl),
        }
    }

    /// Resolve the corporate knowledge for one client
    ///
    /// Returns `None` when the client has no profile at all. A missing AI
    /// config is not an absence: the documented limit defaults apply.
    pub async fn resolve(
        &self,
        corporate_client_id: Uuid,
    ) -> Result<Option<CorporateKnowledge>, KnowledgeError> {
        if let Some(cached) = self.cache.get(&corporate_client_id) {
            tracing::debug!(%corporate_client_id, "Corporate knowledge cache hit");
            return Ok(Some(cached));
        }

        let Some(profile) = self.store.profile(corporate_client_id).await? else {
            tracing::debug!(%corporate_client_id, "No corporate profile, knowledge absent");
            return Ok(None);
        };

        let policies = self.store.active_policies(corporate_client_id).await?;
        let response_templates = self.store.active_templates(corporate_client_id).await?;
        let limits = self
            .store
            .ai_config(corporate_client_id)
            .await?
            .unwrap_or_default()
            .limits;

        let knowledge = CorporateKnowledge {
            profile,
            policies,
            response_templates,
            limits,
        };

        self.cache.insert(corporate_client_id, knowledge.clone());
        tracing::debug!(
            %corporate_client_id,
            policies = knowledge.policies.len(),
            templates = knowledge.response_templates.len(),
            "Corporate knowledge resolved"
        );

        Ok(Some(knowledge))
    }

    /// Drop the cached knowledge for one client
    pub fn invalidate(&self, corporate_client_id: Uuid) {
        self.cache.invalidate(&corporate_client_id);
        tracing::debug!(%corporate_client_id, "Corporate knowledge cache invalidated");
    }

    /// Write a policy through to the store and invalidate that client's entry
    pub async fn upsert_policy(&self, policy: &CorporatePolicy) -> Result<(), KnowledgeError> {
        self.store.upsert_policy(policy).await?;
        self.invalidate(policy.corporate_client_id);
        Ok(())
    }

    /// Write a template through to the store and invalidate that client's entry
    pub async fn upsert_template(&self, template: &ResponseTemplate) -> Result<(), KnowledgeError> {
        self.store.upsert_template(template).await?;
        self.invalidate(template.corporate_client_id);
        Ok(())
    }

    /// Write the AI config through to the store and invalidate that client's entry
    pub async fn set_ai_config(
        &self,
        corporate_client_id: Uuid,
        config: &AiConfig,
    ) -> Result<(), KnowledgeError> {
        self.store.set_ai_config(corporate_client_id, config).await?;
        self.invalidate(corporate_client_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use negotiation_agent_core::{CorporateProfile, NegotiationLimits};
    use negotiation_agent_persistence::InMemoryCorporateStore;

    async fn seeded_store() -> (Arc<InMemoryCorporateStore>, Uuid) {
        let store = Arc::new(InMemoryCorporateStore::new());
        let client_id = Uuid::new_v4();
        store
            .upsert_profile(&CorporateProfile {
                id: client_id,
                name: "Banco Andino".into(),
                description: Some("Cartera de consumo".into()),
                industry: Some("banca".into()),
            })
            .await
            .unwrap();
        (store, client_id)
    }

    #[tokio::test]
    async fn missing_config_uses_defaults() {
        let (store, client_id) = seeded_store().await;
        let resolver = CorporateKnowledgeResolver::new(store, Duration::from_secs(300));

        let knowledge = resolver.resolve(client_id).await.unwrap().unwrap();
        assert_eq!(knowledge.limits, NegotiationLimits::default());
        assert!(knowledge.policies.is_empty());
    }

    #[tokio::test]
    async fn missing_profile_is_absent_knowledge() {
        let store = Arc::new(InMemoryCorporateStore::new());
        let resolver = CorporateKnowledgeResolver::new(store, Duration::from_secs(300));
        assert!(resolver.resolve(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn policy_write_invalidates_only_that_client() {
        let (store, client_id) = seeded_store().await;
        let other_id = Uuid::new_v4();
        store
            .upsert_profile(&CorporateProfile {
                id: other_id,
                name: "Cobranzas del Sur".into(),
                description: None,
                industry: None,
            })
            .await
            .unwrap();

        let resolver = CorporateKnowledgeResolver::new(store, Duration::from_secs(300));
        resolver.resolve(client_id).await.unwrap();
        resolver.resolve(other_id).await.unwrap();

        resolver
            .upsert_policy(&CorporatePolicy {
                id: Uuid::new_v4(),
                corporate_client_id: client_id,
                title: "Nueva política".into(),
                content: "Descuento máximo 10%".into(),
                active: true,
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        // The written client re-reads from the store and sees the new policy
        let knowledge = resolver.resolve(client_id).await.unwrap().unwrap();
        assert_eq!(knowledge.policies.len(), 1);
    }

    #[tokio::test]
    async fn expired_entries_are_recomputed() {
        let (store, client_id) = seeded_store().await;
        let resolver = CorporateKnowledgeResolver::new(store.clone(), Duration::from_millis(0));

        resolver.resolve(client_id).await.unwrap();
        store
            .upsert_template(&ResponseTemplate {
                id: Uuid::new_v4(),
                corporate_client_id: client_id,
                trigger: "discount_request".into(),
                content: "Podemos ofrecer hasta {max_discount}%.".into(),
                active: true,
            })
            .await
            .unwrap();

        let knowledge = resolver.resolve(client_id).await.unwrap().unwrap();
        assert_eq!(knowledge.response_templates.len(), 1);
    }
}

//! Engine configuration

use negotiation_agent_core::NegotiationLimits;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{cache, turn};

/// Tunables for the conversation turn pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Store operation retries per turn
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Hard ceiling on response generation per turn, in seconds. On timeout
    /// the turn falls back to the technical-error response instead of
    /// hanging the conversation.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,

    /// Corporate knowledge cache TTL, in seconds
    #[serde(default = "default_corporate_cache_ttl_secs")]
    pub corporate_cache_ttl_secs: u64,

    /// General metrics cache TTL, in seconds
    #[serde(default = "default_metrics_cache_ttl_secs")]
    pub metrics_cache_ttl_secs: u64,

    /// Limits applied when a corporate client has no AI config
    #[serde(default)]
    pub default_limits: NegotiationLimits,
}

fn default_max_retries() -> u32 {
    turn::MAX_RETRIES
}

fn default_turn_timeout_secs() -> u64 {
    turn::TIMEOUT_SECS
}

fn default_corporate_cache_ttl_secs() -> u64 {
    cache::CORPORATE_TTL_SECS
}

fn default_metrics_cache_ttl_secs() -> u64 {
    cache::METRICS_TTL_SECS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            turn_timeout_secs: default_turn_timeout_secs(),
            corporate_cache_ttl_secs: default_corporate_cache_ttl_secs(),
            metrics_cache_ttl_secs: default_metrics_cache_ttl_secs(),
            default_limits: NegotiationLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn corporate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.corporate_cache_ttl_secs)
    }

    pub fn metrics_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.metrics_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_declared_budget() {
        let config = EngineConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.turn_timeout(), Duration::from_secs(30));
        assert_eq!(config.corporate_cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.metrics_cache_ttl(), Duration::from_secs(300));
    }
}

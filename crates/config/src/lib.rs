//! Configuration management for the negotiation agent
//!
//! Supports loading configuration from:
//! - TOML/YAML files
//! - Environment variables (NEGOTIATION_AGENT_ prefix)
//! - Struct defaults
//!
//! Corporate-client policy (negotiation limits, escalation thresholds,
//! custom response templates) is NOT configured here - it is data, resolved
//! per conversation by the knowledge crate. This crate covers process-level
//! settings only: runtime environment, engine tunables, persistence targets
//! and observability.

pub mod constants;
pub mod engine;
pub mod settings;

pub use engine::EngineConfig;
pub use settings::{
    load_settings, ObservabilityConfig, PersistenceConfig, RuntimeEnvironment, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

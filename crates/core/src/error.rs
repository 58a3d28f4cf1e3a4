//! Core error types

use thiserror::Error;

use crate::conversation::ConversationStatus;

/// Errors raised by core type invariants
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid conversation transition from {from} to {to}")]
    InvalidTransition {
        from: ConversationStatus,
        to: ConversationStatus,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

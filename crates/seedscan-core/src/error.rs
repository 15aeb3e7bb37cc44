//! Engine error types

use seedscan_phrase::PhraseError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Rejected at construction, before any tick can run
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Internal state no longer satisfies the engine's bookkeeping rules
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<PhraseError> for EngineError {
    fn from(e: PhraseError) -> Self {
        EngineError::Configuration(e.to_string())
    }
}

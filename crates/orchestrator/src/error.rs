//! Error types for orchestrator operations.

use brain_core::BrainError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a message or a scheduled firing.
///
/// Tool failures never appear here: the engine feeds them back to the model
/// as `{"error": ...}` results.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The model call failed.
    #[error("model error: {0}")]
    Brain(#[from] BrainError),

    /// Reading or writing the conversation store failed.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Message sending failed.
    #[error("send failed: {0}")]
    SendFailed(String),
}

impl OrchestratorError {
    /// Whether the provider reported a quota or rate limit.
    pub fn is_quota(&self) -> bool {
        matches!(self, OrchestratorError::Brain(err) if err.is_quota())
    }
}

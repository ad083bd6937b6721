//! Error types for model calls.

use thiserror::Error;

/// Errors that can occur while calling a language model.
#[derive(Debug, Clone, Error)]
pub enum BrainError {
    /// Missing or invalid client configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The provider rejected the call because a rate limit or quota was hit.
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// The provider answered but the response could not be used.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The model is temporarily unavailable.
    #[error("brain unavailable: {0}")]
    Unavailable(String),

    /// A timeout occurred during the call.
    #[error("model call timed out")]
    Timeout,
}

impl BrainError {
    /// Whether this error is the provider's rate/quota signal.
    pub fn is_quota(&self) -> bool {
        matches!(self, BrainError::QuotaExceeded(_))
    }
}

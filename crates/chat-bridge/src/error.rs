//! Error types for chat-bridge.

use thiserror::Error;

/// Errors that can occur when talking to the messaging gateway.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The gateway answered with a non-success status.
    #[error("gateway returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Gateway health check failed.
    #[error("Health check failed")]
    HealthCheckFailed,

    /// SSE stream error.
    #[error("SSE error: {0}")]
    Sse(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

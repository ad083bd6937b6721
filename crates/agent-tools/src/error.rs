//! Error types for tool operations.

use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// These never reach the end user directly: the conversation engine renders
/// them as `{"error": "<message>"}` tool results for the model to react to.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool not found in registry.
    #[error("unknown tool")]
    UnknownTool(String),

    /// Missing required parameter.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A device reference matched no mapping.
    #[error("Device '{0}' not found. Use list_devices to see available devices.")]
    EntityNotFound(String),

    /// A backend answered with a non-success status.
    #[error("{service} returned {status}: {message}")]
    Backend {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading device mappings failed.
    #[error("Database error: {0}")]
    Database(#[from] database::DatabaseError),

    /// General execution error, reported verbatim.
    #[error("{0}")]
    ExecutionFailed(String),
}

impl ToolError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ToolError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

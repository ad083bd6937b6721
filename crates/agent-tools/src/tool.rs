//! Tool trait definition and types.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ToolError;

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone)]
pub struct ToolArgs {
    /// Parameters as a JSON object, as generated by the model.
    pub params: Value,
    /// Sender the call is made on behalf of, if any.
    pub sender: Option<String>,
}

impl ToolArgs {
    /// Create new tool arguments with the given parameters.
    pub fn new(params: Value) -> Self {
        Self {
            params,
            sender: None,
        }
    }

    /// Attach the sender on whose behalf the tool runs.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Deserialize the parameters into a tool's typed argument struct.
    ///
    /// `null` is treated as an empty object. Unknown fields are ignored;
    /// missing or mistyped required fields become `InvalidParameter`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, ToolError> {
        let params = match &self.params {
            Value::Null => json!({}),
            other => other.clone(),
        };
        serde_json::from_value(params).map_err(|e| ToolError::invalid("arguments", e.to_string()))
    }
}

/// Output from a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Structured result returned to the model.
    pub content: Value,
    /// Whether the execution was successful.
    pub success: bool,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(content: Value) -> Self {
        Self {
            content,
            success: true,
        }
    }

    /// Create a failed output with an `{"error": ...}` body.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: json!({ "error": message.into() }),
            success: false,
        }
    }

    /// The content as JSON text for the model.
    pub fn to_model_string(&self) -> String {
        self.content.to_string()
    }
}

impl From<ToolError> for ToolOutput {
    fn from(err: ToolError) -> Self {
        ToolOutput::failure(err.to_string())
    }
}

/// Trait for tools the model may call.
///
/// Each tool advertises a JSON schema for its parameters and must turn every
/// failure into a `ToolError` rather than panicking.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON schema of the parameters object.
    fn parameters(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}

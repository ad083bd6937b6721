//! Echo brain implementation - answers with the last user message.

use brain_core::{async_trait, Brain, BrainError, ModelRequest, ModelResponse, Role};

/// A brain that echoes the last user message back.
///
/// Never requests tools. Useful for testing the message flow without any
/// model behaviour.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("Echo: ");
    /// // Will respond with "Echo: <last user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Brain for EchoBrain {
    async fn complete(&self, request: ModelRequest) -> Result<ModelResponse, BrainError> {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let text = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, last_user),
            None => last_user.to_string(),
        };

        Ok(ModelResponse::text(text))
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::ChatMessage;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let brain = EchoBrain::new();
        let request = ModelRequest::new(vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("ok"),
            ChatMessage::user("Hello!"),
        ]);

        let response = brain.complete(request).await.unwrap();
        assert_eq!(response.text.as_deref(), Some("Hello!"));
        assert!(!response.has_tool_calls());
    }

    #[tokio::test]
    async fn test_echo_with_prefix() {
        let brain = EchoBrain::with_prefix("Echo: ");
        let request = ModelRequest::new(vec![ChatMessage::user("Hello!")]);

        let response = brain.complete(request).await.unwrap();
        assert_eq!(response.text.as_deref(), Some("Echo: Hello!"));
    }

    #[tokio::test]
    async fn test_brain_name() {
        assert_eq!(EchoBrain::new().name(), "EchoBrain");
    }
}

//! Tool registry for managing and executing tools.

use std::sync::Arc;

use brain_core::ToolDefinition;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Registry for managing tools.
///
/// The registry maps tool names to their schema and handler. Registration
/// order is preserved so the model always sees the catalog in the same order.
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a shared tool.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Get a list of registered tool names.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Function definitions for every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition::function(t.name(), t.description(), t.parameters()))
            .collect()
    }

    /// Execute a tool by name with the given parameters.
    pub async fn execute(
        &self,
        name: &str,
        params: Value,
        sender: Option<&str>,
    ) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        debug!("Executing tool '{}'", name);

        let mut args = ToolArgs::new(params);
        if let Some(sender) = sender {
            args = args.with_sender(sender);
        }

        let result = tool.execute(args).await?;

        debug!("Tool '{}' completed: success={}", name, result.success);

        Ok(result)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Ping;

    #[async_trait]
    impl Tool for Ping {
        fn name(&self) -> &str {
            "ping"
        }

        fn description(&self) -> &str {
            "Answer with pong"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::success(json!({"pong": true, "sender": args.sender})))
        }
    }

    struct Other;

    #[async_trait]
    impl Tool for Other {
        fn name(&self) -> &str {
            "other"
        }

        fn description(&self) -> &str {
            "Another tool"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
            Err(ToolError::ExecutionFailed("boom".into()))
        }
    }

    #[test]
    fn test_definitions_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Other);
        registry.register(Ping);

        let names: Vec<_> = registry
            .definitions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["other", "ping"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.has_tool("ping"));
    }

    #[tokio::test]
    async fn test_execute_passes_sender() {
        let mut registry = ToolRegistry::new();
        registry.register(Ping);

        let output = registry.execute("ping", json!({}), Some("+1")).await.unwrap();
        assert!(output.success);
        assert_eq!(output.content["sender"], "+1");
    }

    #[tokio::test]
    async fn test_unknown_and_failing_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(Other);

        assert!(matches!(
            registry.execute("nope", json!({}), None).await,
            Err(ToolError::UnknownTool(_))
        ));
        let err = registry.execute("other", json!({}), None).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}

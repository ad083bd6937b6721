//! Shared fixtures for orchestrator integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use agent_tools::{async_trait, Tool, ToolArgs, ToolError, ToolOutput, ToolRegistry};
use brain_core::Brain;
use database::Database;
use orchestrator::{ConversationEngine, EngineConfig, MessageSender, OrchestratorError};
use serde_json::{json, Value};

/// Something the recording sender was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Message { to: String, text: String },
    Reaction { to: String, message_id: String, emoji: String },
}

/// Records every outbound call.
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    ready: AtomicBool,
}

impl Default for RecordingSender {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            ready: AtomicBool::new(true),
        }
    }
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Text messages only, as (recipient, text).
    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { to, text } => Some((to, text)),
                Sent::Reaction { .. } => None,
            })
            .collect()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<(), OrchestratorError> {
        self.sent.lock().unwrap().push(Sent::Message {
            to: recipient.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_reaction(
        &self,
        recipient: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), OrchestratorError> {
        self.sent.lock().unwrap().push(Sent::Reaction {
            to: recipient.to_string(),
            message_id: message_id.to_string(),
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Returns its arguments.
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Return the arguments"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::success(json!({ "echo": args.params })))
    }
}

/// Always fails with "boom".
pub struct BoomTool;

#[async_trait]
impl Tool for BoomTool {
    fn name(&self) -> &str {
        "boom"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
        Err(ToolError::ExecutionFailed("boom".to_string()))
    }
}

pub async fn test_db() -> Database {
    let db = Database::connect_with_pool_size("sqlite::memory:", 1)
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

pub fn test_registry() -> Arc<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(EchoTool);
    registry.register(BoomTool);
    Arc::new(registry)
}

pub fn engine(brain: Arc<dyn Brain>, db: &Database) -> Arc<ConversationEngine> {
    Arc::new(ConversationEngine::new(
        brain,
        test_registry(),
        db.clone(),
        EngineConfig::default(),
    ))
}

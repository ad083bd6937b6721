//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use orchestrator::{ConversationEngine, MessageSender, ReloadHandle};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Engine used for webhook announcements.
    pub engine: Arc<ConversationEngine>,
    /// Outbound chat channel.
    pub sender: Arc<dyn MessageSender>,
    /// Scheduler reload signal.
    pub reload: ReloadHandle,
    /// Shared secret the webhook requires. `None` rejects every call.
    pub webhook_secret: Option<String>,
    /// Where webhook announcements are delivered.
    pub broadcast_destination: Option<String>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        db: Database,
        engine: Arc<ConversationEngine>,
        sender: Arc<dyn MessageSender>,
        reload: ReloadHandle,
    ) -> Self {
        Self {
            db,
            engine,
            sender,
            reload,
            webhook_secret: None,
            broadcast_destination: None,
        }
    }

    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret.filter(|s| !s.is_empty());
        self
    }

    pub fn with_broadcast_destination(mut self, destination: Option<String>) -> Self {
        self.broadcast_destination = destination;
        self
    }
}

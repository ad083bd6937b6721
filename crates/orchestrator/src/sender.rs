//! Message sender trait and implementations.

use async_trait::async_trait;

use crate::error::OrchestratorError;

/// Outbound side of the messaging channel.
///
/// Abstracted to support different transports (the chat bridge, tests, etc.)
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a text message.
    ///
    /// # Arguments
    /// * `recipient` - Sender id or group id
    /// * `text` - Message content
    async fn send_message(&self, recipient: &str, text: &str) -> Result<(), OrchestratorError>;

    /// React to a received message.
    ///
    /// Default implementation does nothing.
    async fn send_reaction(
        &self,
        recipient: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), OrchestratorError> {
        let _ = (recipient, message_id, emoji);
        Ok(())
    }

    /// Whether the channel can deliver messages right now.
    fn is_ready(&self) -> bool {
        true
    }
}

/// A no-op message sender for testing that discards all messages.
#[derive(Debug, Clone, Default)]
pub struct NoOpSender;

#[async_trait]
impl MessageSender for NoOpSender {
    async fn send_message(&self, _recipient: &str, _text: &str) -> Result<(), OrchestratorError> {
        Ok(())
    }
}

/// A logging message sender for debugging that logs all operations.
#[derive(Debug, Clone, Default)]
pub struct LoggingSender;

#[async_trait]
impl MessageSender for LoggingSender {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<(), OrchestratorError> {
        tracing::info!("Sending message to {}: {}", recipient, text);
        Ok(())
    }

    async fn send_reaction(
        &self,
        recipient: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), OrchestratorError> {
        tracing::info!("Reacting {} to {} in {}", emoji, message_id, recipient);
        Ok(())
    }
}

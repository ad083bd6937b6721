//! Outbound replies through the messaging gateway.

use async_trait::async_trait;
use chat_bridge::BridgeClient;
use orchestrator::{MessageSender, OrchestratorError};
use tracing::debug;

/// [`MessageSender`] backed by the messaging gateway.
#[derive(Debug, Clone)]
pub struct BridgeSender {
    client: BridgeClient,
}

impl BridgeSender {
    pub fn new(client: BridgeClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MessageSender for BridgeSender {
    async fn send_message(&self, recipient: &str, text: &str) -> Result<(), OrchestratorError> {
        let result = self
            .client
            .send_text(recipient, text)
            .await
            .map_err(|e| OrchestratorError::SendFailed(e.to_string()))?;
        debug!(recipient = %recipient, id = %result.id, "Message delivered to gateway");
        Ok(())
    }

    async fn send_reaction(
        &self,
        recipient: &str,
        message_id: &str,
        emoji: &str,
    ) -> Result<(), OrchestratorError> {
        self.client
            .react(recipient, message_id, emoji)
            .await
            .map_err(|e| OrchestratorError::SendFailed(e.to_string()))
    }

    fn is_ready(&self) -> bool {
        self.client.is_ready()
    }
}

//! Event loop feeding gateway messages into the router.

use std::future::Future;
use std::sync::Arc;

use chat_bridge::{BridgeClient, BridgeEvent, Envelope};
use futures::StreamExt;
use orchestrator::{RouteOutcome, Router};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ListenerConfig;
use crate::convert::{admit, resolve};
use crate::error::ListenerError;

/// Consumes the gateway event stream and dispatches each message to the
/// router on its own task. Per-sender ordering is the router's concern.
pub struct MessageListener {
    client: BridgeClient,
    router: Arc<Router>,
    config: ListenerConfig,
}

impl MessageListener {
    pub fn new(client: BridgeClient, router: Arc<Router>, config: ListenerConfig) -> Self {
        Self {
            client,
            router,
            config,
        }
    }

    /// Get the underlying gateway client.
    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    /// Whether the channel can currently send.
    pub fn is_ready(&self) -> bool {
        self.client.is_ready()
    }

    /// Handle one gateway event. Returns the routing task for messages.
    pub fn handle_event(&self, event: BridgeEvent) -> Option<JoinHandle<RouteOutcome>> {
        match event {
            BridgeEvent::Message(envelope) => self.dispatch(envelope),
            BridgeEvent::Ready => {
                info!("Chat channel ready");
                None
            }
            BridgeEvent::Disconnected { reason } => {
                warn!(
                    "Chat channel disconnected: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                None
            }
            BridgeEvent::Qr { code } => {
                info!("Chat channel needs pairing, scan QR payload: {}", code);
                None
            }
        }
    }

    fn dispatch(&self, envelope: Envelope) -> Option<JoinHandle<RouteOutcome>> {
        if let Err(reason) = admit(&self.config, &envelope) {
            debug!(sender = %envelope.from, "Skipping message: {}", reason.as_str());
            return None;
        }

        debug!(sender = %envelope.from, id = %envelope.id, "Dispatching message");
        let client = self.client.clone();
        let router = Arc::clone(&self.router);
        Some(tokio::spawn(async move {
            let inbound = resolve(&client, &envelope).await;
            router.route(inbound).await
        }))
    }

    /// Run until the shutdown future completes or the stream gives up.
    pub async fn run_with_shutdown<S>(self, shutdown_signal: S) -> Result<(), ListenerError>
    where
        S: Future<Output = ()> + Send,
    {
        info!("Starting message listener");

        let mut stream =
            chat_bridge::subscribe_with_reconnect(&self.client, self.config.reconnect.clone())?;

        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                biased;

                () = &mut shutdown_signal => {
                    info!("Shutdown signal received, stopping message listener");
                    return Ok(());
                }

                result = stream.next() => {
                    match result {
                        Some(Ok(event)) => {
                            let _ = self.handle_event(event);
                        }
                        Some(Err(e)) => {
                            // The stream reconnects on its own.
                            error!("Stream error: {}", e);
                        }
                        None => {
                            warn!("Event stream ended");
                            return Err(ListenerError::StreamEnded);
                        }
                    }
                }
            }
        }
    }
}

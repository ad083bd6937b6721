//! Server-Sent Events stream of gateway events.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::Stream;
use reqwest_eventsource::retry::ExponentialBackoff;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use tracing::{debug, error, info, warn};

use crate::client::BridgeClient;
use crate::error::BridgeError;
use crate::types::BridgeEvent;

/// Configuration for automatic reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of retries (None = infinite).
    pub max_retries: Option<u32>,
    /// Initial delay before first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Backoff multiplier for each retry.
    pub backoff_multiplier: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: None,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl ReconnectConfig {
    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }

    /// Check if we should retry after the given number of attempts.
    pub fn should_retry(&self, attempts: u32) -> bool {
        self.max_retries.map_or(true, |max| attempts < max)
    }

    fn retry_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(
            self.initial_delay,
            self.backoff_multiplier,
            Some(self.max_delay),
            self.max_retries.map(|n| n as usize),
        )
    }
}

/// A stream of typed gateway events.
///
/// Ready, disconnected and qr events update the owning client's ready flag
/// before they are yielded. Transport errors clear it.
pub struct EventStream {
    event_source: EventSource,
    ready: Arc<AtomicBool>,
}

impl EventStream {
    fn set_ready(&self, ready: bool) {
        if self.ready.swap(ready, Ordering::SeqCst) != ready {
            info!(ready, "Gateway readiness changed");
        }
    }
}

impl Stream for EventStream {
    type Item = Result<BridgeEvent, BridgeError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.event_source).poll_next(cx) {
                Poll::Ready(Some(Ok(Event::Open))) => {
                    debug!("SSE connection opened");
                    continue;
                }
                Poll::Ready(Some(Ok(Event::Message(msg)))) => {
                    match BridgeEvent::parse(&msg.event, &msg.data) {
                        Ok(Some(event)) => {
                            if let Some(ready) = event.readiness() {
                                self.set_ready(ready);
                            }
                            return Poll::Ready(Some(Ok(event)));
                        }
                        Ok(None) => {
                            debug!("Ignoring SSE event type: {}", msg.event);
                            continue;
                        }
                        Err(e) => {
                            warn!("Failed to parse SSE event '{}': {}", msg.event, e);
                            debug!("Raw data: {}", msg.data);
                            continue;
                        }
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    error!("SSE error: {}", e);
                    self.set_ready(false);
                    return Poll::Ready(Some(Err(BridgeError::Sse(e.to_string()))));
                }
                Poll::Ready(None) => {
                    info!("SSE stream ended");
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Subscribe to the gateway's event stream.
pub fn subscribe(client: &BridgeClient) -> Result<EventStream, BridgeError> {
    subscribe_with_reconnect(client, ReconnectConfig::default())
}

/// Subscribe with a custom reconnection policy.
pub fn subscribe_with_reconnect(
    client: &BridgeClient,
    reconnect: ReconnectConfig,
) -> Result<EventStream, BridgeError> {
    let url = client.config().events_url();
    info!("Creating SSE connection to {}", url);

    // Long-lived connection, so no request timeout.
    let sse_client = reqwest::Client::builder().build()?;
    let request = client.authorized(sse_client.get(&url));

    let mut event_source = request
        .eventsource()
        .map_err(|e| BridgeError::Sse(e.to_string()))?;
    event_source.set_retry_policy(Box::new(reconnect.retry_policy()));

    Ok(EventStream {
        event_source,
        ready: client.ready_flag(),
    })
}

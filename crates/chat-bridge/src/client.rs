//! Messaging gateway HTTP client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::types::{HealthResponse, Media, ReactionRequest, SendResult, SendTextRequest};

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Client for the messaging gateway sidecar.
///
/// Cloning is cheap; clones share the HTTP pool and the ready flag.
#[derive(Clone)]
pub struct BridgeClient {
    http: Client,
    config: BridgeConfig,
    ready: Arc<AtomicBool>,
}

impl BridgeClient {
    /// Build a client without contacting the gateway.
    pub fn new(config: BridgeConfig) -> Result<Self, BridgeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(BridgeError::Http)?;

        Ok(Self {
            http,
            config,
            ready: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Build a client and verify the gateway is reachable.
    ///
    /// A reachable gateway whose chat session is not yet paired still
    /// connects; readiness flips once the `ready` event arrives.
    pub async fn connect(config: BridgeConfig) -> Result<Self, BridgeError> {
        let client = Self::new(config)?;

        if client.health_check().await? {
            info!("Connected to messaging gateway at {}", client.config.base_url);
        } else {
            warn!(
                "Messaging gateway at {} is reachable but not ready",
                client.config.base_url
            );
        }

        Ok(client)
    }

    /// Whether the gateway last reported that it can send.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    pub(crate) fn set_ready(&self, ready: bool) {
        let previous = self.ready.swap(ready, Ordering::SeqCst);
        if previous != ready {
            info!(ready, "Gateway readiness changed");
        }
    }

    pub(crate) fn ready_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.ready)
    }

    /// Query the health endpoint and record the reported readiness.
    pub async fn health_check(&self) -> Result<bool, BridgeError> {
        let url = self.config.health_url();
        debug!("Health check: {}", url);

        let response = match self.authorized(self.http.get(&url)).send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.set_ready(false);
                return Err(BridgeError::Http(e));
            }
        };

        let health: HealthResponse = match Self::check(response).await {
            Ok(resp) => resp.json().await?,
            Err(e) => {
                self.set_ready(false);
                return Err(e);
            }
        };

        self.set_ready(health.ready);
        Ok(health.ready)
    }

    /// Send a text message.
    pub async fn send_text(&self, to: &str, text: &str) -> Result<SendResult, BridgeError> {
        debug!(to = %to, "Sending message");
        let response = self
            .authorized(self.http.post(self.config.messages_url()))
            .json(&SendTextRequest { to, text })
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// React to a message with an emoji.
    pub async fn react(&self, to: &str, message_id: &str, emoji: &str) -> Result<(), BridgeError> {
        debug!(to = %to, message_id = %message_id, "Sending reaction");
        let response = self
            .authorized(self.http.post(self.config.reactions_url()))
            .json(&ReactionRequest {
                to,
                message_id,
                emoji,
            })
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    /// Download a media attachment by id.
    pub async fn download_media(&self, media_id: &str) -> Result<Media, BridgeError> {
        let response = self
            .authorized(self.http.get(self.config.media_url(media_id)))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();
        let data = response.bytes().await?.to_vec();

        debug!(media_id = %media_id, bytes = data.len(), "Downloaded media");
        Ok(Media { data, mime_type })
    }

    /// Start a background health monitor that periodically checks the gateway.
    pub fn start_health_monitor(&self, interval: Duration) -> JoinHandle<()> {
        let client = self.clone();

        tokio::spawn(async move {
            let mut consecutive_failures = 0u32;

            loop {
                tokio::time::sleep(interval).await;

                match client.health_check().await {
                    Ok(true) => {
                        if consecutive_failures > 0 {
                            info!("Gateway connection restored");
                        }
                        consecutive_failures = 0;
                    }
                    Ok(false) => {
                        consecutive_failures += 1;
                        warn!(
                            "Gateway reports not ready (failures: {})",
                            consecutive_failures
                        );
                    }
                    Err(e) => {
                        consecutive_failures += 1;
                        error!(
                            "Health check failed: {} (failures: {})",
                            e, consecutive_failures
                        );
                    }
                }
            }
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub(crate) fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(response: Response) -> Result<Response, BridgeError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(BridgeError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeClient")
            .field("base_url", &self.config.base_url)
            .field("ready", &self.is_ready())
            .finish()
    }
}

//! Configuration types for chat-bridge.

use std::env;

/// Default gateway address.
pub const DEFAULT_BRIDGE_URL: &str = "http://127.0.0.1:3000";

/// Configuration for connecting to the messaging gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Base URL of the gateway HTTP server (e.g., "http://127.0.0.1:3000").
    pub base_url: String,
    /// Bearer token the gateway expects, if any.
    pub token: Option<String>,
}

impl BridgeConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Create configuration from environment variables.
    ///
    /// - `BRIDGE_URL` (default: http://127.0.0.1:3000)
    /// - `BRIDGE_TOKEN` (default: none)
    pub fn from_env() -> Self {
        let base_url = env::var("BRIDGE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BRIDGE_URL.to_string());

        let mut config = Self::new(base_url.trim());
        config.token = env::var("BRIDGE_TOKEN")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        config
    }

    pub fn health_url(&self) -> String {
        format!("{}/api/v1/health", self.base_url)
    }

    pub fn messages_url(&self) -> String {
        format!("{}/api/v1/messages", self.base_url)
    }

    pub fn reactions_url(&self) -> String {
        format!("{}/api/v1/reactions", self.base_url)
    }

    pub fn media_url(&self, media_id: &str) -> String {
        format!("{}/api/v1/media/{}", self.base_url, urlencoding::encode(media_id))
    }

    pub fn events_url(&self) -> String {
        format!("{}/api/v1/events", self.base_url)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_urls() {
        let config = BridgeConfig::new("http://gateway:3000/");
        assert_eq!(config.health_url(), "http://gateway:3000/api/v1/health");
        assert_eq!(config.messages_url(), "http://gateway:3000/api/v1/messages");
        assert_eq!(config.reactions_url(), "http://gateway:3000/api/v1/reactions");
        assert_eq!(config.events_url(), "http://gateway:3000/api/v1/events");
        assert_eq!(
            config.media_url("abc/def"),
            "http://gateway:3000/api/v1/media/abc%2Fdef"
        );
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("BRIDGE_URL");
        env::remove_var("BRIDGE_TOKEN");

        assert_eq!(BridgeConfig::from_env(), BridgeConfig::default());

        env::set_var("BRIDGE_URL", "http://10.0.0.5:4000/");
        env::set_var("BRIDGE_TOKEN", " secret ");
        let config = BridgeConfig::from_env();
        assert_eq!(config.base_url, "http://10.0.0.5:4000");
        assert_eq!(config.token.as_deref(), Some("secret"));

        env::remove_var("BRIDGE_URL");
        env::remove_var("BRIDGE_TOKEN");
    }
}

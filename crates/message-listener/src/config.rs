//! Listener configuration.

use std::env;

use chat_bridge::ReconnectConfig;

/// Configuration for the message listener.
#[derive(Debug, Clone, Default)]
pub struct ListenerConfig {
    /// The bot's own account id; messages from it are dropped.
    pub self_id: Option<String>,
    /// Senders allowed to talk to the bot. Empty allows everyone.
    pub allowed_senders: Vec<String>,
    /// Reconnection policy for the event stream.
    pub reconnect: ReconnectConfig,
}

impl ListenerConfig {
    /// Create configuration from environment variables.
    ///
    /// - `BOT_SELF_ID` (default: none)
    /// - `ALLOWED_SENDERS` comma-separated (default: allow all)
    pub fn from_env() -> Self {
        let self_id = env::var("BOT_SELF_ID")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let allowed_senders = env::var("ALLOWED_SENDERS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            self_id,
            allowed_senders,
            reconnect: ReconnectConfig::default(),
        }
    }

    pub fn with_self_id(mut self, self_id: impl Into<String>) -> Self {
        self.self_id = Some(self_id.into());
        self
    }

    pub fn with_allowed_senders<I, S>(mut self, senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_senders = senders.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `sender` is the bot itself.
    pub fn is_self(&self, sender: &str) -> bool {
        self.self_id
            .as_deref()
            .is_some_and(|id| normalize_id(id) == normalize_id(sender))
    }

    /// Whether `sender` passes the allow-list.
    pub fn is_allowed(&self, sender: &str) -> bool {
        if self.allowed_senders.is_empty() {
            return true;
        }
        let sender = normalize_id(sender);
        self.allowed_senders
            .iter()
            .any(|allowed| normalize_id(allowed) == sender)
    }
}

/// Reduce a channel id to comparable form: no leading `+`, no `@domain`
/// suffix, no spaces or dashes.
pub fn normalize_id(id: &str) -> String {
    let id = id.trim();
    let id = id.split('@').next().unwrap_or(id);
    id.trim_start_matches('+')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("+972 50-123-4567"), "972501234567");
        assert_eq!(normalize_id("972501234567@c.us"), "972501234567");
        assert_eq!(normalize_id("group-id"), "groupid");
    }

    #[test]
    fn test_allow_list() {
        let open = ListenerConfig::default();
        assert!(open.is_allowed("anyone"));

        let closed = ListenerConfig::default().with_allowed_senders(["+972501234567"]);
        assert!(closed.is_allowed("972501234567@c.us"));
        assert!(!closed.is_allowed("972500000000"));
    }

    #[test]
    fn test_self_filter() {
        let config = ListenerConfig::default().with_self_id("+972509999999");
        assert!(config.is_self("972509999999"));
        assert!(!config.is_self("972501234567"));
        assert!(!ListenerConfig::default().is_self("972509999999"));
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var("BOT_SELF_ID");
        env::remove_var("ALLOWED_SENDERS");

        let config = ListenerConfig::from_env();
        assert!(config.self_id.is_none());
        assert!(config.allowed_senders.is_empty());

        env::set_var("BOT_SELF_ID", " +972509999999 ");
        env::set_var("ALLOWED_SENDERS", "+972501, ,+972502");
        let config = ListenerConfig::from_env();
        assert_eq!(config.self_id.as_deref(), Some("+972509999999"));
        assert_eq!(config.allowed_senders, vec!["+972501", "+972502"]);

        env::remove_var("BOT_SELF_ID");
        env::remove_var("ALLOWED_SENDERS");
    }
}

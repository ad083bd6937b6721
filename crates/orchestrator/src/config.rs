//! Configuration for the engine, router and scheduler.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::classifier::DeviceVocabulary;

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Conversation engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Most recent turns replayed to the model.
    pub history_limit: usize,
    /// Tool rounds allowed before the loop gives up.
    pub max_tool_iterations: usize,
    /// Temperature for device-related and voice requests.
    pub device_temperature: f32,
    /// Temperature for everything else.
    pub chat_temperature: f32,
    /// Temperature for broadcast announcements.
    pub broadcast_temperature: f32,
    pub vocabulary: DeviceVocabulary,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            max_tool_iterations: 5,
            device_temperature: 0.1,
            chat_temperature: 0.7,
            broadcast_temperature: 0.9,
            vocabulary: DeviceVocabulary::default(),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// - `ENGINE_HISTORY_LIMIT` (default: 20)
    /// - `ENGINE_MAX_TOOL_ITERATIONS` (default: 5)
    /// - `ENGINE_DEVICE_TEMPERATURE` (default: 0.1)
    /// - `ENGINE_CHAT_TEMPERATURE` (default: 0.7)
    /// - `ENGINE_BROADCAST_TEMPERATURE` (default: 0.9)
    /// - `ENGINE_DEVICE_KEYWORDS` - comma-separated vocabulary (default: built-in list)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let vocabulary = non_empty_env("ENGINE_DEVICE_KEYWORDS")
            .map(|list| DeviceVocabulary::new(list.split(',')))
            .unwrap_or(defaults.vocabulary);

        Self {
            history_limit: parse_env("ENGINE_HISTORY_LIMIT").unwrap_or(defaults.history_limit),
            max_tool_iterations: parse_env("ENGINE_MAX_TOOL_ITERATIONS")
                .unwrap_or(defaults.max_tool_iterations),
            device_temperature: parse_env("ENGINE_DEVICE_TEMPERATURE")
                .unwrap_or(defaults.device_temperature),
            chat_temperature: parse_env("ENGINE_CHAT_TEMPERATURE")
                .unwrap_or(defaults.chat_temperature),
            broadcast_temperature: parse_env("ENGINE_BROADCAST_TEMPERATURE")
                .unwrap_or(defaults.broadcast_temperature),
            vocabulary,
        }
    }
}

/// Message router settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterConfig {
    /// Inactivity after which a sender's history is cleared.
    pub session_timeout: Duration,
    pub command_prefix: String,
    /// Reaction sent once a message is classified; `None` disables it.
    pub ack_reaction: Option<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            session_timeout: Duration::from_secs(600),
            command_prefix: "/".to_string(),
            ack_reaction: Some("👀".to_string()),
        }
    }
}

impl RouterConfig {
    /// Create configuration from environment variables.
    ///
    /// - `ROUTER_SESSION_TIMEOUT_SECS` (default: 600)
    /// - `ROUTER_COMMAND_PREFIX` (default: /)
    /// - `ROUTER_ACK_REACTION` (default: 👀, set empty to disable)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let ack_reaction = match env::var("ROUTER_ACK_REACTION") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value.trim().to_string()),
            Err(_) => defaults.ack_reaction,
        };

        Self {
            session_timeout: parse_env("ROUTER_SESSION_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_timeout),
            command_prefix: non_empty_env("ROUTER_COMMAND_PREFIX")
                .unwrap_or(defaults.command_prefix),
            ack_reaction,
        }
    }
}

/// Scheduler settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// Where scheduled output goes. Firings are skipped while unset.
    pub broadcast_destination: Option<String>,
    /// Identity scheduled prompts run as.
    pub sender_id: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            broadcast_destination: None,
            sender_id: "system".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Create configuration from environment variables.
    ///
    /// - `BROADCAST_DESTINATION` (default: unset)
    /// - `SCHEDULER_SENDER_ID` (default: system)
    pub fn from_env() -> Self {
        Self {
            broadcast_destination: non_empty_env("BROADCAST_DESTINATION"),
            sender_id: non_empty_env("SCHEDULER_SENDER_ID")
                .unwrap_or_else(|| Self::default().sender_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 11] = [
        "ENGINE_HISTORY_LIMIT",
        "ENGINE_MAX_TOOL_ITERATIONS",
        "ENGINE_DEVICE_TEMPERATURE",
        "ENGINE_CHAT_TEMPERATURE",
        "ENGINE_BROADCAST_TEMPERATURE",
        "ENGINE_DEVICE_KEYWORDS",
        "ROUTER_SESSION_TIMEOUT_SECS",
        "ROUTER_COMMAND_PREFIX",
        "ROUTER_ACK_REACTION",
        "BROADCAST_DESTINATION",
        "SCHEDULER_SENDER_ID",
    ];

    fn clear() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear();

        let engine = EngineConfig::from_env();
        assert_eq!(engine.history_limit, 20);
        assert_eq!(engine.max_tool_iterations, 5);
        assert_eq!(engine.device_temperature, 0.1);
        assert!(engine.vocabulary.is_device_related("turn on the lamp"));
        assert_eq!(RouterConfig::from_env(), RouterConfig::default());
        assert_eq!(SchedulerConfig::from_env(), SchedulerConfig::default());

        env::set_var("ENGINE_HISTORY_LIMIT", "8");
        env::set_var("ENGINE_MAX_TOOL_ITERATIONS", "not-a-number");
        env::set_var("ENGINE_DEVICE_KEYWORDS", "sprinkler, pool pump");
        env::set_var("ROUTER_SESSION_TIMEOUT_SECS", "60");
        env::set_var("ROUTER_COMMAND_PREFIX", "!");
        env::set_var("ROUTER_ACK_REACTION", "");
        env::set_var("BROADCAST_DESTINATION", "family-group");

        let engine = EngineConfig::from_env();
        assert_eq!(engine.history_limit, 8);
        assert_eq!(engine.max_tool_iterations, 5);
        assert!(engine.vocabulary.is_device_related("start the pool pump"));
        assert!(!engine.vocabulary.is_device_related("turn on the lamp"));

        let router = RouterConfig::from_env();
        assert_eq!(router.session_timeout, Duration::from_secs(60));
        assert_eq!(router.command_prefix, "!");
        assert!(router.ack_reaction.is_none());

        let scheduler = SchedulerConfig::from_env();
        assert_eq!(scheduler.broadcast_destination.as_deref(), Some("family-group"));
        assert_eq!(scheduler.sender_id, "system");

        clear();
    }
}

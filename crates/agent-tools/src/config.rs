//! Backend configuration for the household tools.

use std::env;
use std::sync::Arc;

use tracing::info;

use crate::backends::{
    CalendarService, GoogleCalendar, GoogleTasks, HomeAssistant, HomeAutomation, TaskListService,
};
use crate::error::ToolError;

/// Default Google calendar id.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Default Google task list id.
pub const DEFAULT_TASKLIST_ID: &str = "@default";

/// Home Assistant connection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeAssistantConfig {
    pub url: String,
    pub token: String,
}

/// Google API settings shared by the calendar and task list clients.
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleConfig {
    pub access_token: String,
    pub calendar_id: String,
    pub tasklist_id: String,
}

/// Which backends are configured.
///
/// A backend left as `None` disables the tools that need it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolsConfig {
    pub home_assistant: Option<HomeAssistantConfig>,
    pub google: Option<GoogleConfig>,
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ToolsConfig {
    /// Read backend settings from the environment.
    ///
    /// - `HOME_ASSISTANT_URL` and `HOME_ASSISTANT_TOKEN` (both needed)
    /// - `GOOGLE_ACCESS_TOKEN`, `GOOGLE_CALENDAR_ID` (default: primary),
    ///   `GOOGLE_TASKLIST_ID` (default: @default)
    pub fn from_env() -> Self {
        let home_assistant = match (non_empty("HOME_ASSISTANT_URL"), non_empty("HOME_ASSISTANT_TOKEN")) {
            (Some(url), Some(token)) => Some(HomeAssistantConfig {
                url: url.trim_end_matches('/').to_string(),
                token,
            }),
            _ => None,
        };

        let google = non_empty("GOOGLE_ACCESS_TOKEN").map(|access_token| GoogleConfig {
            access_token,
            calendar_id: non_empty("GOOGLE_CALENDAR_ID")
                .unwrap_or_else(|| DEFAULT_CALENDAR_ID.to_string()),
            tasklist_id: non_empty("GOOGLE_TASKLIST_ID")
                .unwrap_or_else(|| DEFAULT_TASKLIST_ID.to_string()),
        });

        Self {
            home_assistant,
            google,
        }
    }
}

/// Constructed backend clients.
#[derive(Clone, Default)]
pub struct Backends {
    pub home: Option<Arc<dyn HomeAutomation>>,
    pub calendar: Option<Arc<dyn CalendarService>>,
    pub tasks: Option<Arc<dyn TaskListService>>,
}

impl Backends {
    /// Build HTTP clients for every configured backend.
    pub fn from_config(config: &ToolsConfig) -> Result<Self, ToolError> {
        let mut backends = Backends::default();

        if let Some(ha) = &config.home_assistant {
            info!("Home Assistant backend at {}", ha.url);
            backends.home = Some(Arc::new(HomeAssistant::new(&ha.url, &ha.token)?));
        }

        if let Some(google) = &config.google {
            info!(
                "Google backends: calendar={} tasklist={}",
                google.calendar_id, google.tasklist_id
            );
            backends.calendar = Some(Arc::new(GoogleCalendar::new(
                &google.access_token,
                &google.calendar_id,
            )?));
            backends.tasks = Some(Arc::new(GoogleTasks::new(
                &google.access_token,
                &google.tasklist_id,
            )?));
        }

        Ok(backends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "HOME_ASSISTANT_URL",
        "HOME_ASSISTANT_TOKEN",
        "GOOGLE_ACCESS_TOKEN",
        "GOOGLE_CALENDAR_ID",
        "GOOGLE_TASKLIST_ID",
    ];

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        for var in VARS {
            env::remove_var(var);
        }

        assert_eq!(ToolsConfig::from_env(), ToolsConfig::default());

        // Half-configured Home Assistant stays disabled.
        env::set_var("HOME_ASSISTANT_URL", "http://ha.local:8123/");
        assert!(ToolsConfig::from_env().home_assistant.is_none());

        env::set_var("HOME_ASSISTANT_TOKEN", "ha-token");
        env::set_var("GOOGLE_ACCESS_TOKEN", "g-token");
        let config = ToolsConfig::from_env();
        assert_eq!(
            config.home_assistant,
            Some(HomeAssistantConfig {
                url: "http://ha.local:8123".to_string(),
                token: "ha-token".to_string(),
            })
        );
        let google = config.google.unwrap();
        assert_eq!(google.calendar_id, DEFAULT_CALENDAR_ID);
        assert_eq!(google.tasklist_id, DEFAULT_TASKLIST_ID);

        env::set_var("GOOGLE_CALENDAR_ID", "family@group.calendar.google.com");
        assert_eq!(
            ToolsConfig::from_env().google.unwrap().calendar_id,
            "family@group.calendar.google.com"
        );

        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_backends_follow_config() {
        let none = Backends::from_config(&ToolsConfig::default()).unwrap();
        assert!(none.home.is_none() && none.calendar.is_none() && none.tasks.is_none());

        let config = ToolsConfig {
            home_assistant: None,
            google: Some(GoogleConfig {
                access_token: "t".to_string(),
                calendar_id: DEFAULT_CALENDAR_ID.to_string(),
                tasklist_id: DEFAULT_TASKLIST_ID.to_string(),
            }),
        };
        let google = Backends::from_config(&config).unwrap();
        assert!(google.home.is_none());
        assert!(google.calendar.is_some() && google.tasks.is_some());
    }
}

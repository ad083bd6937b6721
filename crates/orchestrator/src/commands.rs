//! Slash commands.

use database::{device_mapping, Database};

use crate::error::OrchestratorError;

/// Help text shown by the help command.
pub const HELP_TEXT: &str = r#"I'm the household assistant. Just write (or send a voice note) in plain language, for example:
• "Turn on the big lamp in the living room"
• "Is the bedroom AC on?"
• "Add milk to the shopping list"
• "What's on the calendar this week?"

Commands:
/help - Show this message
/reset - Forget our conversation
/devices - List the devices I know by name"#;

pub const RESET_CONFIRMATION: &str = "Conversation cleared. Let's start fresh.";

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Reset,
    Devices,
    Unknown(String),
}

impl Command {
    /// Parse `text` if it starts with `prefix`.
    ///
    /// Only the first word counts; arguments are ignored.
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix(prefix)?;
        let name = rest.split_whitespace().next().unwrap_or_default().to_lowercase();

        Some(match name.as_str() {
            "help" | "start" => Command::Help,
            "reset" | "clear" => Command::Reset,
            "devices" => Command::Devices,
            _ => Command::Unknown(name),
        })
    }
}

/// Text listing every device mapping, grouped by location order.
pub async fn device_listing(db: &Database) -> Result<String, OrchestratorError> {
    let devices = device_mapping::list(db.pool()).await?;
    if devices.is_empty() {
        return Ok("No devices are configured yet.".to_string());
    }

    let mut text = String::from("Devices:");
    for device in devices {
        text.push_str("\n• ");
        text.push_str(&device.nickname);
        if !device.location.is_empty() {
            text.push_str(&format!(" ({})", device.location));
        }
        text.push_str(&format!(" - {}", device.entity_id));
    }
    Ok(text)
}

pub fn unknown_command_reply(name: &str, prefix: &str) -> String {
    format!(
        "Unknown command '{}{}'. Send {}help to see what I can do.",
        prefix, name, prefix
    )
}

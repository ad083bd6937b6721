//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One persisted message in a sender's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ConversationTurn {
    pub id: i64,
    pub sender_id: String,
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// How a keyword rule answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum KeywordKind {
    /// Reply with the payload verbatim.
    Static,
    /// Forward to the model with the payload as extra instructions.
    Ai,
}

impl KeywordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeywordKind::Static => "static",
            KeywordKind::Ai => "ai",
        }
    }
}

/// A literal-text shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct KeywordRule {
    pub id: i64,
    /// Comma-separated literal alternatives, matched case-insensitively.
    pub pattern: String,
    pub kind: KeywordKind,
    pub payload: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields an administrator supplies for a keyword rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewKeywordRule {
    pub pattern: String,
    pub kind: KeywordKind,
    pub payload: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A prompt fired on a cron schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ScheduledPrompt {
    pub id: i64,
    pub name: String,
    /// Six-field cron expression (seconds first).
    pub schedule: String,
    pub prompt: String,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields an administrator supplies for a scheduled prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScheduledPrompt {
    pub name: String,
    pub schedule: String,
    pub prompt: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A nickname for a home-automation entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeviceMapping {
    pub id: i64,
    /// Canonical id, e.g. "light.living_room".
    pub entity_id: String,
    pub nickname: String,
    pub location: String,
    pub category: String,
    pub created_at: String,
}

/// Fields an administrator supplies for a device mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeviceMapping {
    pub entity_id: String,
    pub nickname: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: String,
}

/// A tool invocation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ToolAuditEntry {
    pub id: i64,
    pub sender_id: String,
    pub tool_name: String,
    /// Arguments as the model sent them.
    pub arguments: String,
    pub success: bool,
    /// Tool output or error message (possibly truncated).
    pub content: String,
    pub created_at: String,
}

fn default_enabled() -> bool {
    true
}

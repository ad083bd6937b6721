//! Backend services the household tools call.
//!
//! Each service sits behind a trait so tools can be tested with in-memory
//! fakes. The HTTP implementations authenticate with bearer tokens.

mod google_calendar;
mod google_tasks;
mod home_assistant;

pub use google_calendar::GoogleCalendar;
pub use google_tasks::GoogleTasks;
pub use home_assistant::HomeAssistant;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Current state of a home-automation entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
    #[serde(default)]
    pub attributes: Value,
    #[serde(default)]
    pub last_changed: Option<String>,
}

/// Home-automation service (lights, switches, climate).
#[async_trait]
pub trait HomeAutomation: Send + Sync {
    /// Call `<domain>.<service>` with a service data object.
    async fn call_service(&self, domain: &str, service: &str, data: Value) -> Result<(), ToolError>;

    /// Read the current state of an entity.
    async fn get_state(&self, entity_id: &str) -> Result<EntityState, ToolError>;
}

/// A calendar event to create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalendarEvent {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub description: Option<String>,
}

/// A calendar event as stored by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Calendar service.
#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn add_event(&self, event: &NewCalendarEvent) -> Result<CalendarEvent, ToolError>;

    /// Events overlapping `[from, to)`, ordered by start time.
    async fn list_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, ToolError>;
}

/// An entry on a task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub completed: bool,
}

/// Task-list service, used as the shopping list.
#[async_trait]
pub trait TaskListService: Send + Sync {
    async fn add_task(&self, title: &str, notes: Option<&str>) -> Result<TaskItem, ToolError>;

    /// Tasks that are not yet completed.
    async fn list_open_tasks(&self) -> Result<Vec<TaskItem>, ToolError>;

    async fn complete_task(&self, task_id: &str) -> Result<TaskItem, ToolError>;
}

/// Turn a non-success response into `ToolError::Backend`.
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ToolError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message: String = body.chars().take(200).collect();
    Err(ToolError::Backend {
        service,
        status: status.as_u16(),
        message: if message.is_empty() {
            status.canonical_reason().unwrap_or("error").to_string()
        } else {
            message
        },
    })
}

pub(crate) fn http_client() -> Result<reqwest::Client, ToolError> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()?)
}

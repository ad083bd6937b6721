//! Calendar tools.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backends::{CalendarService, NewCalendarEvent};
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Default look-ahead for event listings.
const DEFAULT_DAYS: u32 = 7;
const MAX_DAYS: u32 = 60;

/// Parse a model-supplied timestamp.
///
/// Accepts RFC 3339, or a local `YYYY-MM-DD[ T]HH:MM[:SS]` / `YYYY-MM-DD`
/// interpreted in the host timezone.
pub(crate) fn parse_when(field: &str, value: &str) -> Result<DateTime<FixedOffset>, ToolError> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed);
    }

    let naive = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(9, 0, 0))
        })
        .ok_or_else(|| ToolError::invalid(field, format!("unrecognized date/time '{}'", value)))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(DateTime::<FixedOffset>::from)
        .ok_or_else(|| ToolError::invalid(field, format!("'{}' does not exist in local time", value)))
}

#[derive(Debug, Deserialize)]
struct AddEventArgs {
    title: String,
    start: String,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Adds an event to the family calendar.
pub struct AddCalendarEvent {
    calendar: Arc<dyn CalendarService>,
}

impl AddCalendarEvent {
    pub fn new(calendar: Arc<dyn CalendarService>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for AddCalendarEvent {
    fn name(&self) -> &str {
        "add_calendar_event"
    }

    fn description(&self) -> &str {
        "Add an event to the family calendar. Times are ISO 8601; end defaults to one hour after start."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "start": {"type": "string", "description": "Start time, e.g. 2026-03-02T10:00"},
                "end": {"type": "string", "description": "End time; defaults to start + 1 hour"},
                "description": {"type": "string"}
            },
            "required": ["title", "start"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let args: AddEventArgs = args.parse()?;
        if args.title.trim().is_empty() {
            return Err(ToolError::invalid("title", "must not be empty"));
        }

        let start = parse_when("start", &args.start)?;
        let end = match args.end.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(end) => parse_when("end", end)?,
            None => start + Duration::hours(1),
        };
        if end < start {
            return Err(ToolError::invalid("end", "must not be before start"));
        }

        let event = self
            .calendar
            .add_event(&NewCalendarEvent {
                title: args.title.trim().to_string(),
                start,
                end,
                description: args.description,
            })
            .await?;

        Ok(ToolOutput::success(json!({ "created": event })))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListEventsArgs {
    #[serde(default)]
    days: Option<u32>,
}

/// Lists upcoming calendar events.
pub struct ListCalendarEvents {
    calendar: Arc<dyn CalendarService>,
}

impl ListCalendarEvents {
    pub fn new(calendar: Arc<dyn CalendarService>) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl Tool for ListCalendarEvents {
    fn name(&self) -> &str {
        "list_calendar_events"
    }

    fn description(&self) -> &str {
        "List upcoming events on the family calendar."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days": {"type": "integer", "minimum": 1, "maximum": MAX_DAYS, "description": "How many days ahead (default 7)"}
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let args: ListEventsArgs = args.parse()?;
        let days = args.days.unwrap_or(DEFAULT_DAYS).clamp(1, MAX_DAYS);

        let from = Utc::now();
        let to = from + Duration::days(i64::from(days));
        let events = self.calendar.list_events(from, to).await?;

        Ok(ToolOutput::success(json!({
            "days": days,
            "count": events.len(),
            "events": events,
        })))
    }
}

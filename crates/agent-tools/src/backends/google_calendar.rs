//! Google Calendar v3 client.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{check_status, http_client, CalendarEvent, CalendarService, NewCalendarEvent};
use crate::error::ToolError;

const SERVICE: &str = "Google Calendar";
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Client for one Google calendar.
pub struct GoogleCalendar {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    calendar_id: String,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

#[derive(Debug, Deserialize, Serialize)]
struct ApiEvent {
    #[serde(default)]
    id: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Option<String>,
    start: EventTime,
    end: EventTime,
}

/// Timed events carry `dateTime`, all-day events carry `date`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
}

impl EventTime {
    fn value(self) -> String {
        self.date_time.or(self.date).unwrap_or_default()
    }
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        CalendarEvent {
            id: event.id,
            title: event.summary,
            start: event.start.value(),
            end: event.end.value(),
            description: event.description,
        }
    }
}

impl GoogleCalendar {
    pub fn new(
        access_token: impl Into<String>,
        calendar_id: impl Into<String>,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            client: http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            calendar_id: calendar_id.into(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn add_event(&self, event: &NewCalendarEvent) -> Result<CalendarEvent, ToolError> {
        let mut body = json!({
            "summary": event.title,
            "start": { "dateTime": event.start.to_rfc3339() },
            "end": { "dateTime": event.end.to_rfc3339() },
        });
        if let Some(ref description) = event.description {
            body["description"] = json!(description);
        }

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let created: ApiEvent = check_status(SERVICE, response).await?.json().await?;
        Ok(created.into())
    }

    async fn list_events(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, ToolError> {
        let time_min = from.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = to.to_rfc3339_opts(SecondsFormat::Secs, true);

        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", "50"),
            ])
            .send()
            .await?;

        let list: EventList = check_status(SERVICE, response).await?.json().await?;
        Ok(list.items.into_iter().map(CalendarEvent::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_url_encodes_calendar_id() {
        let calendar = GoogleCalendar::new("t", "family@group.calendar.google.com").unwrap();
        assert_eq!(
            calendar.events_url(),
            "https://www.googleapis.com/calendar/v3/calendars/family%40group.calendar.google.com/events"
        );
    }

    #[test]
    fn test_event_list_parsing_handles_all_day_events() {
        let list: EventList = serde_json::from_str(
            r#"{"items":[
                {"id":"1","summary":"Dentist","start":{"dateTime":"2026-03-02T10:00:00+02:00"},"end":{"dateTime":"2026-03-02T11:00:00+02:00"}},
                {"id":"2","summary":"Holiday","start":{"date":"2026-03-03"},"end":{"date":"2026-03-04"}}
            ]}"#,
        )
        .unwrap();

        let events: Vec<CalendarEvent> = list.items.into_iter().map(Into::into).collect();
        assert_eq!(events[0].title, "Dentist");
        assert_eq!(events[0].start, "2026-03-02T10:00:00+02:00");
        assert_eq!(events[1].start, "2026-03-03");
        assert!(events[1].description.is_none());
    }
}

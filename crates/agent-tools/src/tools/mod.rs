//! Built-in household tools.

mod calendar;
mod devices;
mod shopping;

pub use calendar::{AddCalendarEvent, ListCalendarEvents};
pub use devices::{ControlDevice, DeviceAction, GetDeviceState, ListDevices};
pub use shopping::{AddShoppingItem, CompleteShoppingItem, ListShoppingItems};

#[cfg(test)]
pub(crate) mod fakes {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use database::{device_mapping, Database, NewDeviceMapping};
    use serde_json::{json, Value};

    use crate::backends::{
        CalendarEvent, CalendarService, EntityState, HomeAutomation, NewCalendarEvent, TaskItem,
        TaskListService,
    };
    use crate::error::ToolError;

    /// In-memory database with three named devices.
    pub async fn seeded_db() -> Database {
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();

        for (entity_id, nickname, location, category) in [
            ("light.a", "מנורה", "סלון", "light"),
            ("light.b", "מנורה גדולה", "סלון", "light"),
            ("climate.bedroom_ac", "מזגן", "bedroom", "climate"),
        ] {
            device_mapping::create(
                db.pool(),
                &NewDeviceMapping {
                    entity_id: entity_id.to_string(),
                    nickname: nickname.to_string(),
                    location: location.to_string(),
                    category: category.to_string(),
                },
            )
            .await
            .unwrap();
        }
        db
    }

    #[derive(Default)]
    pub struct FakeHome {
        calls: Mutex<Vec<(String, Value)>>,
        states: Mutex<HashMap<String, String>>,
    }

    impl FakeHome {
        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn set_state(&self, entity_id: &str, state: &str) {
            self.states
                .lock()
                .unwrap()
                .insert(entity_id.to_string(), state.to_string());
        }
    }

    #[async_trait]
    impl HomeAutomation for FakeHome {
        async fn call_service(&self, domain: &str, service: &str, data: Value) -> Result<(), ToolError> {
            self.calls
                .lock()
                .unwrap()
                .push((format!("{}.{}", domain, service), data));
            Ok(())
        }

        async fn get_state(&self, entity_id: &str) -> Result<EntityState, ToolError> {
            let state = self
                .states
                .lock()
                .unwrap()
                .get(entity_id)
                .cloned()
                .ok_or_else(|| ToolError::EntityNotFound(entity_id.to_string()))?;
            Ok(EntityState {
                entity_id: entity_id.to_string(),
                state,
                attributes: json!({}),
                last_changed: None,
            })
        }
    }

    #[derive(Default)]
    pub struct FakeCalendar {
        added: Mutex<Vec<NewCalendarEvent>>,
    }

    impl FakeCalendar {
        pub fn added(&self) -> Vec<NewCalendarEvent> {
            self.added.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CalendarService for FakeCalendar {
        async fn add_event(&self, event: &NewCalendarEvent) -> Result<CalendarEvent, ToolError> {
            let mut added = self.added.lock().unwrap();
            added.push(event.clone());
            Ok(CalendarEvent {
                id: format!("evt{}", added.len()),
                title: event.title.clone(),
                start: event.start.to_rfc3339(),
                end: event.end.to_rfc3339(),
                description: event.description.clone(),
            })
        }

        async fn list_events(
            &self,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> Result<Vec<CalendarEvent>, ToolError> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    pub struct FakeTasks {
        items: Mutex<Vec<TaskItem>>,
    }

    #[async_trait]
    impl TaskListService for FakeTasks {
        async fn add_task(&self, title: &str, notes: Option<&str>) -> Result<TaskItem, ToolError> {
            let mut items = self.items.lock().unwrap();
            let item = TaskItem {
                id: format!("task{}", items.len() + 1),
                title: title.to_string(),
                notes: notes.map(str::to_string),
                completed: false,
            };
            items.push(item.clone());
            Ok(item)
        }

        async fn list_open_tasks(&self) -> Result<Vec<TaskItem>, ToolError> {
            Ok(self
                .items
                .lock()
                .unwrap()
                .iter()
                .filter(|t| !t.completed)
                .cloned()
                .collect())
        }

        async fn complete_task(&self, task_id: &str) -> Result<TaskItem, ToolError> {
            let mut items = self.items.lock().unwrap();
            let item = items
                .iter_mut()
                .find(|t| t.id == task_id)
                .ok_or_else(|| ToolError::ExecutionFailed(format!("no task {}", task_id)))?;
            item.completed = true;
            Ok(item.clone())
        }
    }
}

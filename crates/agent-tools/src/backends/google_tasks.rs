//! Google Tasks v1 client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{check_status, http_client, TaskItem, TaskListService};
use crate::error::ToolError;

const SERVICE: &str = "Google Tasks";
const DEFAULT_BASE_URL: &str = "https://tasks.googleapis.com/tasks/v1";

/// Client for one Google task list.
pub struct GoogleTasks {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    tasklist_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskList {
    #[serde(default)]
    items: Vec<ApiTask>,
}

#[derive(Debug, Deserialize)]
struct ApiTask {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    status: String,
}

impl From<ApiTask> for TaskItem {
    fn from(task: ApiTask) -> Self {
        TaskItem {
            id: task.id,
            title: task.title,
            notes: task.notes,
            completed: task.status == "completed",
        }
    }
}

impl GoogleTasks {
    pub fn new(
        access_token: impl Into<String>,
        tasklist_id: impl Into<String>,
    ) -> Result<Self, ToolError> {
        Ok(Self {
            client: http_client()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: access_token.into(),
            tasklist_id: tasklist_id.into(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn tasks_url(&self) -> String {
        format!(
            "{}/lists/{}/tasks",
            self.base_url,
            urlencoding::encode(&self.tasklist_id)
        )
    }
}

#[async_trait]
impl TaskListService for GoogleTasks {
    async fn add_task(&self, title: &str, notes: Option<&str>) -> Result<TaskItem, ToolError> {
        let mut body = json!({ "title": title });
        if let Some(notes) = notes {
            body["notes"] = json!(notes);
        }

        let response = self
            .client
            .post(self.tasks_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let task: ApiTask = check_status(SERVICE, response).await?.json().await?;
        Ok(task.into())
    }

    async fn list_open_tasks(&self) -> Result<Vec<TaskItem>, ToolError> {
        let response = self
            .client
            .get(self.tasks_url())
            .bearer_auth(&self.access_token)
            .query(&[("showCompleted", "false"), ("maxResults", "100")])
            .send()
            .await?;

        let list: TaskList = check_status(SERVICE, response).await?.json().await?;
        Ok(list
            .items
            .into_iter()
            .map(TaskItem::from)
            .filter(|t| !t.completed)
            .collect())
    }

    async fn complete_task(&self, task_id: &str) -> Result<TaskItem, ToolError> {
        let url = format!("{}/{}", self.tasks_url(), urlencoding::encode(task_id));

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "status": "completed" }))
            .send()
            .await?;

        let task: ApiTask = check_status(SERVICE, response).await?.json().await?;
        Ok(task.into())
    }
}

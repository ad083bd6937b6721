//! Shopping list tools backed by a task list.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::backends::{TaskItem, TaskListService};
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

#[derive(Debug, Deserialize)]
struct AddItemArgs {
    item: String,
    #[serde(default)]
    quantity: Option<u32>,
}

/// Adds an item to the shopping list.
pub struct AddShoppingItem {
    tasks: Arc<dyn TaskListService>,
}

impl AddShoppingItem {
    pub fn new(tasks: Arc<dyn TaskListService>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl Tool for AddShoppingItem {
    fn name(&self) -> &str {
        "add_shopping_item"
    }

    fn description(&self) -> &str {
        "Add an item to the shared shopping list."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item": {"type": "string"},
                "quantity": {"type": "integer", "minimum": 1}
            },
            "required": ["item"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let args: AddItemArgs = args.parse()?;
        let item = args.item.trim();
        if item.is_empty() {
            return Err(ToolError::invalid("item", "must not be empty"));
        }

        let title = match args.quantity {
            Some(quantity) if quantity > 1 => format!("{} x{}", item, quantity),
            _ => item.to_string(),
        };

        let task = self.tasks.add_task(&title, None).await?;
        Ok(ToolOutput::success(json!({ "added": task.title })))
    }
}

/// Lists open shopping list items.
pub struct ListShoppingItems {
    tasks: Arc<dyn TaskListService>,
}

impl ListShoppingItems {
    pub fn new(tasks: Arc<dyn TaskListService>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl Tool for ListShoppingItems {
    fn name(&self) -> &str {
        "list_shopping_items"
    }

    fn description(&self) -> &str {
        "List the items still on the shopping list."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let items: Vec<String> = self
            .tasks
            .list_open_tasks()
            .await?
            .into_iter()
            .map(|t| t.title)
            .collect();

        Ok(ToolOutput::success(json!({
            "count": items.len(),
            "items": items,
        })))
    }
}

#[derive(Debug, Deserialize)]
struct CompleteItemArgs {
    item: String,
}

/// Marks a shopping list item as bought.
pub struct CompleteShoppingItem {
    tasks: Arc<dyn TaskListService>,
}

impl CompleteShoppingItem {
    pub fn new(tasks: Arc<dyn TaskListService>) -> Self {
        Self { tasks }
    }
}

/// Exact (case-insensitive) title match first, then substring.
fn find_item<'a>(items: &'a [TaskItem], wanted: &str) -> Option<&'a TaskItem> {
    let wanted = wanted.trim().to_lowercase();
    items
        .iter()
        .find(|t| t.title.trim().to_lowercase() == wanted)
        .or_else(|| items.iter().find(|t| t.title.to_lowercase().contains(&wanted)))
}

#[async_trait]
impl Tool for CompleteShoppingItem {
    fn name(&self) -> &str {
        "complete_shopping_item"
    }

    fn description(&self) -> &str {
        "Mark an item on the shopping list as bought."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "item": {"type": "string"}
            },
            "required": ["item"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let args: CompleteItemArgs = args.parse()?;
        if args.item.trim().is_empty() {
            return Err(ToolError::invalid("item", "must not be empty"));
        }

        let open = self.tasks.list_open_tasks().await?;
        let task = find_item(&open, &args.item).ok_or_else(|| {
            ToolError::ExecutionFailed(format!("'{}' is not on the shopping list", args.item.trim()))
        })?;

        let done = self.tasks.complete_task(&task.id).await?;
        Ok(ToolOutput::success(json!({ "completed": done.title })))
    }
}

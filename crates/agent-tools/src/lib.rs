//! Tool registry, entity resolution and household tools.
//!
//! The conversation engine hands the model the catalog from a
//! [`ToolRegistry`] and dispatches the model's tool calls back through it.
//! Tools take typed arguments parsed from the model's JSON and report
//! failures as [`ToolError`], which the engine turns into `{"error": ...}`
//! results instead of aborting.
//!
//! # Built-in Tools
//!
//! ## Devices
//! - [`ListDevices`] - Named device mappings, optionally filtered. Always available.
//! - [`ControlDevice`] - Turn a device on/off, set brightness or temperature.
//! - [`GetDeviceState`] - Live state of a device.
//!
//! ## Calendar
//! - [`AddCalendarEvent`] / [`ListCalendarEvents`]
//!
//! ## Shopping list
//! - [`AddShoppingItem`] / [`ListShoppingItems`] / [`CompleteShoppingItem`]
//!
//! Device references are resolved with [`resolver::resolve`] against the
//! stored device mappings.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_tools::{household_registry, Backends, ToolsConfig};
//! use serde_json::json;
//!
//! let backends = Backends::from_config(&ToolsConfig::from_env())?;
//! let registry = household_registry(db.clone(), &backends);
//!
//! let result = registry
//!     .execute("list_devices", json!({"location": "סלון"}), Some("+972500000000"))
//!     .await?;
//! println!("{}", result.to_model_string());
//! ```

pub mod backends;
mod config;
mod error;
mod registry;
pub mod resolver;
mod tool;
pub mod tools;

pub use config::{
    Backends, GoogleConfig, HomeAssistantConfig, ToolsConfig, DEFAULT_CALENDAR_ID,
    DEFAULT_TASKLIST_ID,
};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolOutput};
pub use tools::{
    AddCalendarEvent, AddShoppingItem, CompleteShoppingItem, ControlDevice, DeviceAction,
    GetDeviceState, ListCalendarEvents, ListDevices, ListShoppingItems,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

use database::Database;

/// Build the household tool catalog.
///
/// `list_devices` is always registered; every other tool only when its
/// backend is present.
pub fn household_registry(db: Database, backends: &Backends) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(ListDevices::new(db.clone()));

    if let Some(home) = &backends.home {
        registry.register(ControlDevice::new(db.clone(), home.clone()));
        registry.register(GetDeviceState::new(db, home.clone()));
    }

    if let Some(calendar) = &backends.calendar {
        registry.register(AddCalendarEvent::new(calendar.clone()));
        registry.register(ListCalendarEvents::new(calendar.clone()));
    }

    if let Some(tasks) = &backends.tasks {
        registry.register(AddShoppingItem::new(tasks.clone()));
        registry.register(ListShoppingItems::new(tasks.clone()));
        registry.register(CompleteShoppingItem::new(tasks.clone()));
    }

    registry
}

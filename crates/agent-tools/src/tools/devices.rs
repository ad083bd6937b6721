//! Device listing and control tools.

use std::sync::Arc;

use async_trait::async_trait;
use database::{device_mapping, Database, DeviceMapping};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::backends::HomeAutomation;
use crate::error::ToolError;
use crate::resolver;
use crate::tool::{Tool, ToolArgs, ToolOutput};

/// Lists the device mappings the household has named.
///
/// # Parameters
///
/// - `location` (optional): Only devices in this location.
/// - `category` (optional): Only devices of this category.
pub struct ListDevices {
    db: Database,
}

#[derive(Debug, Default, Deserialize)]
struct ListDevicesArgs {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

impl ListDevices {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn matches_filter(value: &str, filter: &Option<String>) -> bool {
    match filter.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => value.to_lowercase().contains(&wanted.to_lowercase()),
    }
}

fn describe(mapping: &DeviceMapping) -> Value {
    json!({
        "entity_id": mapping.entity_id,
        "nickname": mapping.nickname,
        "location": mapping.location,
        "category": mapping.category,
    })
}

#[async_trait]
impl Tool for ListDevices {
    fn name(&self) -> &str {
        "list_devices"
    }

    fn description(&self) -> &str {
        "List the household's named devices with their entity ids, locations and categories."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {"type": "string", "description": "Only devices in this room or area"},
                "category": {"type": "string", "description": "Only devices of this category, e.g. light"}
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let args: ListDevicesArgs = args.parse()?;
        let devices: Vec<Value> = device_mapping::list(self.db.pool())
            .await?
            .iter()
            .filter(|m| matches_filter(&m.location, &args.location))
            .filter(|m| matches_filter(&m.category, &args.category))
            .map(describe)
            .collect();

        Ok(ToolOutput::success(json!({
            "count": devices.len(),
            "devices": devices,
        })))
    }
}

/// What to do with a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceAction {
    TurnOn,
    TurnOff,
    Toggle,
}

impl DeviceAction {
    fn service(&self) -> &'static str {
        match self {
            DeviceAction::TurnOn => "turn_on",
            DeviceAction::TurnOff => "turn_off",
            DeviceAction::Toggle => "toggle",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ControlDeviceArgs {
    device: String,
    action: DeviceAction,
    #[serde(default)]
    brightness: Option<u8>,
    #[serde(default)]
    temperature: Option<f64>,
}

/// Turns devices on or off, sets brightness or target temperature.
///
/// # Parameters
///
/// - `device` (required): Nickname, sentence or canonical entity id.
/// - `action` (required): `turn_on`, `turn_off` or `toggle`.
/// - `brightness` (optional): Light brightness percentage.
/// - `temperature` (optional): Target temperature; calls `climate.set_temperature`.
pub struct ControlDevice {
    db: Database,
    home: Arc<dyn HomeAutomation>,
}

impl ControlDevice {
    pub fn new(db: Database, home: Arc<dyn HomeAutomation>) -> Self {
        Self { db, home }
    }
}

/// The service call a control request maps to: (domain, service, data).
fn plan_call(entity_id: &str, args: &ControlDeviceArgs) -> Result<(String, &'static str, Value), ToolError> {
    let domain = entity_id.split('.').next().unwrap_or_default().to_string();
    let mut data = Map::new();
    data.insert("entity_id".to_string(), json!(entity_id));

    if let Some(brightness) = args.brightness {
        if brightness > 100 {
            return Err(ToolError::invalid("brightness", "must be between 0 and 100"));
        }
    }

    if args.action != DeviceAction::TurnOff {
        if let Some(temperature) = args.temperature {
            data.insert("temperature".to_string(), json!(temperature));
            return Ok(("climate".to_string(), "set_temperature", Value::Object(data)));
        }
    }

    if args.action == DeviceAction::TurnOn && domain == "light" {
        if let Some(brightness) = args.brightness {
            data.insert("brightness_pct".to_string(), json!(brightness));
        }
    }

    Ok((domain, args.action.service(), Value::Object(data)))
}

#[async_trait]
impl Tool for ControlDevice {
    fn name(&self) -> &str {
        "control_device"
    }

    fn description(&self) -> &str {
        "Turn a device on or off, toggle it, set light brightness or a thermostat temperature. \
         Always call this to change a device; never assume its state from earlier messages."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "device": {"type": "string", "description": "Device nickname as the user said it, or its entity id"},
                "action": {"type": "string", "enum": ["turn_on", "turn_off", "toggle"]},
                "brightness": {"type": "integer", "minimum": 0, "maximum": 100, "description": "Light brightness percent"},
                "temperature": {"type": "number", "description": "Target temperature for climate devices"}
            },
            "required": ["device", "action"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let args: ControlDeviceArgs = args.parse()?;
        let mappings = device_mapping::list(self.db.pool()).await?;
        let entity_id = resolver::resolve(&args.device, &mappings)?;

        let (domain, service, data) = plan_call(&entity_id, &args)?;
        info!("Device control: {}.{} on {}", domain, service, entity_id);
        self.home.call_service(&domain, service, data).await?;

        Ok(ToolOutput::success(json!({
            "entity_id": entity_id,
            "service": format!("{}.{}", domain, service),
            "status": "ok",
        })))
    }
}

#[derive(Debug, Deserialize)]
struct DeviceStateArgs {
    device: String,
}

/// Reads the live state of a device.
pub struct GetDeviceState {
    db: Database,
    home: Arc<dyn HomeAutomation>,
}

impl GetDeviceState {
    pub fn new(db: Database, home: Arc<dyn HomeAutomation>) -> Self {
        Self { db, home }
    }
}

#[async_trait]
impl Tool for GetDeviceState {
    fn name(&self) -> &str {
        "get_device_state"
    }

    fn description(&self) -> &str {
        "Get the current live state of a device. Use this for any status question instead of \
         relying on conversation history."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "device": {"type": "string", "description": "Device nickname as the user said it, or its entity id"}
            },
            "required": ["device"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let args: DeviceStateArgs = args.parse()?;
        let mappings = device_mapping::list(self.db.pool()).await?;
        let entity_id = resolver::resolve(&args.device, &mappings)?;

        let state = self.home.get_state(&entity_id).await?;
        Ok(ToolOutput::success(json!({
            "entity_id": state.entity_id,
            "state": state.state,
            "attributes": state.attributes,
            "last_changed": state.last_changed,
        })))
    }
}

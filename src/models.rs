use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::{
    actions::{ActionDispatcher, ActionRegistry},
    devices::DeviceRegistry,
    events::EventBus,
    serial::SerialTransport,
};

/// Power device as reported by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PowerDeviceView {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub channel: i64,
    #[serde(rename = "on")]
    pub on_channel: i64,
    #[serde(rename = "off")]
    pub off_channel: i64,
    pub max_value: i64,
    pub powered_state: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActionView {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateResponse {
    pub ok: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UpdateParams {
    /// Device name, matched exactly.
    pub device: String,
    /// Requested value; must parse as an integer.
    pub val: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActionParams {
    /// Forwarded to the script when it parses as an integer.
    pub val: Option<String>,
}

#[derive(Debug)]
pub struct AppState {
    pub devices: DeviceRegistry,
    pub actions: ActionRegistry,
    pub serial: SerialTransport,
    pub dispatcher: ActionDispatcher,
    pub events: Arc<EventBus>,
}

impl AppState {
    pub fn new(
        devices: DeviceRegistry,
        actions: ActionRegistry,
        serial: SerialTransport,
        dispatcher: ActionDispatcher,
    ) -> Self {
        let events = dispatcher.events();
        Self {
            devices,
            actions,
            serial,
            dispatcher,
            events,
        }
    }
}

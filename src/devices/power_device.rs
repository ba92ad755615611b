// power_device.rs
use tokio::sync::Mutex;
use tracing::info;

use super::DeviceKind;
use crate::{
    commands::SerialCommand, config::DeviceRecord, error::AppError, models::PowerDeviceView,
    serial::SerialTransport,
};

#[derive(Debug)]
pub struct PowerDevice {
    name: String,
    kind: DeviceKind,
    channel: i64,
    on_channel: i64,
    off_channel: i64,
    powered_state: Mutex<i64>,
}

impl PowerDevice {
    pub fn from_record(record: &DeviceRecord) -> Self {
        Self {
            name: record.name.clone(),
            kind: DeviceKind::from_record(record),
            channel: record.channel,
            on_channel: record.on_channel,
            off_channel: record.off_channel,
            powered_state: Mutex::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_value(&self) -> i64 {
        self.kind.max_value()
    }

    pub async fn powered_state(&self) -> i64 {
        *self.powered_state.lock().await
    }

    /// Encodes `value`, writes it and records it as the powered state.
    ///
    /// The state records what was requested, not what the controller
    /// confirmed: it is updated even when the serial write fails, and the
    /// write error is still returned. Rejected values leave it untouched.
    pub async fn request(
        &self,
        value: i64,
        serial: &SerialTransport,
    ) -> Result<SerialCommand, AppError> {
        let command = self.kind.encode(&self.name, value)?;

        let mut state = self.powered_state.lock().await;
        let written = serial.send(&command).await;
        *state = value;
        written?;

        info!(device = %self.name, value, line = %command, "[device_change]");
        Ok(command)
    }

    /// Legacy toggle: pulses the configured on or off channel.
    pub async fn toggle(
        &self,
        on: bool,
        serial: &SerialTransport,
    ) -> Result<SerialCommand, AppError> {
        let command = SerialCommand::toggle(if on { self.on_channel } else { self.off_channel });

        let mut state = self.powered_state.lock().await;
        let written = serial.send(&command).await;
        *state = i64::from(on);
        written?;

        info!(
            device = %self.name,
            "[device_change]: {} turning {}",
            self.name,
            if on { "on" } else { "off" }
        );
        Ok(command)
    }

    pub async fn snapshot(&self) -> PowerDeviceView {
        PowerDeviceView {
            name: self.name.clone(),
            kind: self.kind.type_name().to_string(),
            channel: self.channel,
            on_channel: self.on_channel,
            off_channel: self.off_channel,
            max_value: self.max_value(),
            powered_state: self.powered_state().await,
        }
    }
}

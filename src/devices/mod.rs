// devices/mod.rs
mod power_device;
pub use power_device::PowerDevice;

use crate::{
    commands::{SerialCommand, SignalTag},
    config::DeviceRecord,
    error::AppError,
    models::PowerDeviceView,
    serial::SerialTransport,
};
use std::time::Duration;
use tracing::{info, warn};

/// How a device is driven on the wire. Each variant owns its value domain
/// and the channel it addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    Local { channel: i64 },
    Remote { on_channel: i64, off_channel: i64 },
    Dmx { channel: i64 },
    Unknown(String),
}

impl DeviceKind {
    pub fn from_record(record: &DeviceRecord) -> Self {
        match record.kind.as_str() {
            "local" => DeviceKind::Local {
                channel: record.channel,
            },
            "remote" => DeviceKind::Remote {
                on_channel: record.on_channel,
                off_channel: record.off_channel,
            },
            "dmx" => DeviceKind::Dmx {
                channel: record.channel,
            },
            other => DeviceKind::Unknown(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            DeviceKind::Local { .. } => "local",
            DeviceKind::Remote { .. } => "remote",
            DeviceKind::Dmx { .. } => "dmx",
            DeviceKind::Unknown(name) => name,
        }
    }

    /// Largest legal value; unknown kinds accept nothing.
    pub fn max_value(&self) -> i64 {
        match self {
            DeviceKind::Local { .. } | DeviceKind::Remote { .. } => 1,
            DeviceKind::Dmx { .. } => 255,
            DeviceKind::Unknown(_) => 0,
        }
    }

    /// Builds the wire command that sets `device` to `value`.
    ///
    /// Remote devices pulse a dedicated on or off channel, so the encoded
    /// value is always 1 and the requested value only picks the channel.
    pub fn encode(&self, device: &str, value: i64) -> Result<SerialCommand, AppError> {
        let (tag, channel, wire_value) = match self {
            DeviceKind::Local { channel } => (SignalTag::Local, *channel, value),
            DeviceKind::Remote {
                on_channel,
                off_channel,
            } => {
                let channel = if value == 1 { *on_channel } else { *off_channel };
                (SignalTag::Remote, channel, 1)
            }
            DeviceKind::Dmx { channel } => (SignalTag::Dmx, *channel, value),
            DeviceKind::Unknown(kind) => return Err(AppError::UnknownDeviceType(kind.clone())),
        };

        if !(0..=self.max_value()).contains(&value) {
            return Err(AppError::InvalidValue {
                device: device.to_string(),
                kind: self.type_name().to_string(),
                value,
            });
        }
        Ok(SerialCommand::signal(tag, channel, wire_value))
    }
}

/// Power devices in catalog order.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<PowerDevice>,
}

impl DeviceRegistry {
    pub fn from_records(records: &[DeviceRecord]) -> Self {
        Self {
            devices: records.iter().map(PowerDevice::from_record).collect(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&PowerDevice> {
        self.devices.iter().find(|device| device.name() == name)
    }

    pub async fn snapshot(&self) -> Vec<PowerDeviceView> {
        let mut views = Vec::with_capacity(self.devices.len());
        for device in &self.devices {
            views.push(device.snapshot().await);
        }
        views
    }

    /// Drives every device to 0, pausing `delay` between commands so the
    /// controller is not flooded at boot.
    pub async fn reset_all(&self, serial: &SerialTransport, delay: Duration) {
        for device in &self.devices {
            match device.request(0, serial).await {
                Ok(command) => info!(device = device.name(), line = %command, "Device reset"),
                Err(err) => warn!(device = device.name(), error = %err, "Device reset failed"),
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

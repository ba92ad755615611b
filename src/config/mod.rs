// config/mod.rs
use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub serial: SerialSettings,
    pub catalog: CatalogSettings,
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub address: String,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialSettings {
    pub enabled: bool,
    pub path: String,
    pub baud_rate: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    pub path: PathBuf,
    pub scripts_dir: PathBuf,
    pub reset_on_start: bool,
    pub reset_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub port: u16,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load("config/config")
    }

    /// Layers `base` (optional, any format `config` understands) and `APP__*`
    /// environment variables over the built-in defaults.
    pub fn load(base: &str) -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("server.address", "0.0.0.0:8080")?
            .set_default("server.static_dir", "views")?
            .set_default("serial.enabled", true)?
            .set_default("serial.path", "/dev/master")?
            .set_default("serial.baud_rate", 19200)?
            .set_default("catalog.path", "conf.json")?
            .set_default("catalog.scripts_dir", "scripts")?
            .set_default("catalog.reset_on_start", true)?
            .set_default("catalog.reset_delay_ms", 100)?
            .set_default("metrics.enabled", false)?
            .set_default("metrics.port", 9000)?
            .add_source(File::with_name(base).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid catalog: {0}")]
    Invalid(#[from] ValidationErrors),
}

/// Device and action declarations, in file order.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "unique_names"))]
pub struct Catalog {
    #[serde(default, alias = "power_devices")]
    #[validate(nested)]
    pub devices: Vec<DeviceRecord>,
    #[serde(default, alias = "action_devices")]
    #[validate(nested)]
    pub actions: Vec<ActionRecord>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DeviceRecord {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub channel: i64,
    #[serde(default, rename = "on")]
    #[validate(range(min = 0))]
    pub on_channel: i64,
    #[serde(default, rename = "off")]
    #[validate(range(min = 0))]
    pub off_channel: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActionRecord {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[validate(length(min = 1))]
    pub path: String,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }
}

fn unique_names(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if let Some(dup) = catalog.devices.iter().find(|d| !seen.insert(d.name.as_str())) {
        let mut err = ValidationError::new("duplicate_device");
        err.message = Some(format!("device {:?} declared twice", dup.name).into());
        return Err(err);
    }

    let mut seen = HashSet::new();
    if let Some(dup) = catalog.actions.iter().find(|a| !seen.insert(a.name.as_str())) {
        let mut err = ValidationError::new("duplicate_action");
        err.message = Some(format!("action {:?} declared twice", dup.name).into());
        return Err(err);
    }
    Ok(())
}

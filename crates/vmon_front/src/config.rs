use vmon_core::Settings;
use vmon_util::{MemSpace, Radix};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::io;
use std::path::PathBuf;
use std::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config directory")]
    ConfigDir,

    #[error("Failed to load config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to deserialize config file: {0}")]
    Deserialize(#[from] toml::de::Error),
}

/// How checkpoint hits are written to the observer log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObserverFormat {
    /// A JSON object per line.
    #[default]
    Json,
    /// The fixed size records of the binary remote protocol.
    Binary,
}

/// Settings read from the config file. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub radix: Radix,
    pub device: MemSpace,
    pub sidefx: bool,
    /// How deep checkpoint commands and playback may nest.
    pub max_command_depth: usize,
    /// Filter used for logging unless 'RUST_LOG' is set.
    pub log_level: String,
    /// Write every checkpoint hit to this file.
    pub observer_log: Option<PathBuf>,
    pub observer_format: ObserverFormat,
    /// Monitor commands executed at start.
    pub startup: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            radix: settings.radix,
            device: settings.device,
            sidefx: settings.sidefx,
            max_command_depth: settings.max_depth,
            log_level: "info".to_string(),
            observer_log: None,
            observer_format: ObserverFormat::Json,
            startup: None,
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::ConfigDir)?;
        Ok(dir.join("vmon").join("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        Ok(toml::from_str(&fs::read_to_string(&path)?)?)
    }

    /// The settings the monitor starts with.
    pub fn settings(&self) -> Settings {
        Settings {
            radix: self.radix,
            device: self.device,
            sidefx: self.sidefx,
            max_depth: self.max_command_depth,
        }
    }
}

#[test]
fn partial_config() {
    let config: Config = toml::from_str(r#"
        radix = "dec"
        device = "8"
        observer_log = "/tmp/hits.jsonl"
    "#).unwrap();
    assert_eq!(config.radix, Radix::Dec);
    assert_eq!(config.device, MemSpace::Disk8);
    assert_eq!(config.max_command_depth, 16);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.observer_log, Some(PathBuf::from("/tmp/hits.jsonl")));
    assert_eq!(config.observer_format, ObserverFormat::Json);
    assert!(config.startup.is_none());

    let config: Config = toml::from_str("observer_format = \"binary\"").unwrap();
    assert_eq!(config.observer_format, ObserverFormat::Binary);
}

#[test]
fn bad_config() {
    assert!(toml::from_str::<Config>("radix = \"sexagesimal\"").is_err());
}

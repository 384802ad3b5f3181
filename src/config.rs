// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use crate::drivers::AcquisitionConfig;
use crate::types::ConnectionMode;

pub const DEFAULT_CONFIG_PATH: &str = "inoscope.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    pub mode: ConnectionMode,
    pub port_name: String,
    pub baud_rate: u32,
    /// Capture file read by `ConnectionMode::Replay`, one `a0,a1` line per sample.
    pub replay_file: PathBuf,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            mode: ConnectionMode::Simulation,
            port_name: if cfg!(windows) { "COM3" } else { "/dev/ttyACM0" }.to_string(),
            baud_rate: 9600,
            replay_file: PathBuf::from("capture.txt"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection: ConnectionSettings,
    pub acquisition: AcquisitionConfig,
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(raw).context("invalid config JSON")?;
        config
            .acquisition
            .validate()
            .map_err(|e| anyhow!("invalid acquisition settings: {e}"))?;
        if config.connection.baud_rate == 0 {
            return Err(anyhow!("baud_rate must be greater than zero"));
        }
        Ok(config)
    }

    /// Reads `path`, or writes the defaults there when it does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = AppConfig::default();
            config.save(path)?;
            info!("wrote default config to {}", path.display());
            return Ok(config);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{"connection":{"mode":"serial","port_name":"COM7"},
                "acquisition":{"calibration":{"input_scale":10}}}"#,
        )
        .unwrap();
        assert_eq!(config.connection.mode, ConnectionMode::Serial);
        assert_eq!(config.connection.port_name, "COM7");
        assert_eq!(config.connection.baud_rate, 9600);
        assert_eq!(config.acquisition.calibration.input_scale, 10);
        assert_eq!(config.acquisition.calibration.amplitude_multiplier, 1.0);
        assert_eq!(config.acquisition.display.scroll_speed, 50);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(AppConfig::from_json(r#"{"acquisition":{"calibration":{"time_scale":0}}}"#).is_err());
        assert!(AppConfig::from_json(r#"{"connection":{"baud_rate":0}}"#).is_err());
        assert!(AppConfig::from_json("not json").is_err());
    }

    #[test]
    fn creates_then_reloads_file() {
        let dir = std::env::temp_dir().join(format!("inoscope-config-{}", std::process::id()));
        let path = dir.join("inoscope.json");
        let _ = fs::remove_file(&path);
        let created = AppConfig::load_or_create(&path).unwrap();
        assert_eq!(created, AppConfig::default());
        let mut changed = created.clone();
        changed.acquisition.display.auto_scroll = true;
        changed.save(&path).unwrap();
        assert_eq!(AppConfig::load_or_create(&path).unwrap(), changed);
        let _ = fs::remove_dir_all(&dir);
    }
}

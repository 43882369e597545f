//! Persistent preferences for the wizard driver.

use std::{
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::paths::{write_atomic, PathResolver};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    /// Where rides are stored; the application directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_driver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_vehicle_id: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "es-CO".into(),
            currency: "COP".into(),
            data_dir: None,
            last_driver_id: None,
            last_vehicle_id: None,
        }
    }
}

impl Config {
    /// Records the driver and vehicle used for the latest registration.
    pub fn remember_session(&mut self, driver_id: &str, vehicle_id: Option<&str>) {
        self.last_driver_id = Some(driver_id.to_string());
        self.last_vehicle_id = vehicle_id.map(str::to_string);
    }
}

/// Loads and saves [`Config`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Manager for `config.json` inside `base`, or inside the application
    /// directory when `base` is `None`.
    pub fn with_base_dir(base: Option<PathBuf>) -> Self {
        let base = PathResolver::resolve_base(base);
        Self::new(PathResolver::config_file_in(&base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored config, or the defaults when none was saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.path, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_colombian_defaults() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::with_base_dir(Some(dir.path().to_path_buf()));
        let config = manager.load().expect("load defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.locale, "es-CO");
        assert_eq!(config.currency, "COP");
    }

    #[test]
    fn saved_config_is_loaded_back() {
        let dir = tempdir().expect("tempdir");
        let manager = ConfigManager::new(dir.path().join("nested").join("config.json"));
        let mut config = Config::default();
        config.remember_session("driver-7", Some("ABC123"));
        manager.save(&config).expect("save config");

        let loaded = manager.load().expect("load config");
        assert_eq!(loaded.last_driver_id.as_deref(), Some("driver-7"));
        assert_eq!(loaded.last_vehicle_id.as_deref(), Some("ABC123"));
    }

    #[test]
    fn malformed_config_reports_serde_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ locale: ").unwrap();
        let err = ConfigManager::new(path).load().expect_err("malformed");
        assert!(matches!(err, ConfigError::Serde(_)));
    }
}

use std::result::Result as StdResult;

use thiserror::Error;

use crate::config::ConfigError;

/// Crate-level error for everything outside the wizard's own `error` field:
/// storage, configuration, imports and bad caller input.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Import error: {0}")]
    Import(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = StdResult<T, WizardError>;

impl From<std::io::Error> for WizardError {
    fn from(err: std::io::Error) -> Self {
        WizardError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for WizardError {
    fn from(err: serde_json::Error) -> Self {
        WizardError::Storage(err.to_string())
    }
}

impl From<ConfigError> for WizardError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => WizardError::Storage(io.to_string()),
            ConfigError::Serde(message) => WizardError::Config(message),
        }
    }
}

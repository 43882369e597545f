//! Terminal driver: walks a driver through the wizard and stores the ride.

pub mod answers;
pub mod args;
pub mod output;
mod prompter;
mod session;

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::errors::WizardError;

pub use args::CliArgs;
pub use prompter::{CliMode, Prompter, ScriptPrompter};
pub use session::{run_cli, run_with, run_with_prompter};

/// Environment variable that switches the driver to line-by-line stdin input.
pub const SCRIPT_MODE_ENV: &str = "RIDE_WIZARD_CLI_SCRIPT";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] WizardError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Core(err.into())
    }
}

use std::io::BufRead;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::cli::answers::{answer_hint, choice_options, yes_no, BACK_COMMANDS};
use crate::cli::output;
use crate::cli::CliError;
use crate::wizard::WizardStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Source of raw answers for the wizard session.
pub trait Prompter {
    /// Raw answer for `step`; parsed by [`crate::cli::answers::parse_answer`].
    fn answer(&mut self, step: WizardStep) -> Result<String, CliError>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError>;
}

#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl Prompter for DialoguerPrompter {
    fn answer(&mut self, step: WizardStep) -> Result<String, CliError> {
        if let Some(options) = choice_options(step) {
            let mut items: Vec<&str> = options.iter().map(|(_, label)| *label).collect();
            items.push("← Volver");
            let selection = Select::with_theme(&self.theme)
                .with_prompt(step.config().question)
                .items(&items)
                .default(0)
                .interact()?;
            return Ok(options
                .get(selection)
                .map(|(id, _)| id.to_string())
                .unwrap_or_else(|| BACK_COMMANDS[0].to_string()));
        }

        let hint = answer_hint(step);
        let prompt = if hint.is_empty() {
            "Respuesta (< para volver)".to_string()
        } else {
            format!("Respuesta [{hint}] (< para volver)")
        };
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// Reads one answer per line. End of input answers `salir` and declines
/// every confirmation.
pub struct ScriptPrompter<R> {
    input: R,
}

impl<R: BufRead> ScriptPrompter<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn next_line(&mut self) -> Result<Option<String>, CliError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

impl<R: BufRead> Prompter for ScriptPrompter<R> {
    fn answer(&mut self, _step: WizardStep) -> Result<String, CliError> {
        Ok(self.next_line()?.unwrap_or_else(|| "salir".to_string()))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CliError> {
        output::prompt(prompt);
        let Some(line) = self.next_line()? else {
            return Ok(false);
        };
        let lowered = line.trim().to_lowercase();
        if lowered.is_empty() {
            return Ok(default);
        }
        yes_no(&lowered).map_err(CliError::Input)
    }
}

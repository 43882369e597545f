use serde::Serialize;

use crate::domain::RideDraft;
use crate::wizard::step::WizardStep;

/// Everything the wizard knows about one form session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardState {
    pub current_step: WizardStep,
    /// Steps visited so far; never empty and always ends at `current_step`.
    pub step_history: Vec<WizardStep>,
    pub form_data: RideDraft,
    pub is_submitting: bool,
    pub error: Option<String>,
    /// Id returned by the submitter once the ride was accepted.
    pub submitted_record_id: Option<String>,
}

impl WizardState {
    pub fn initial() -> Self {
        Self {
            current_step: WizardStep::first(),
            step_history: vec![WizardStep::first()],
            form_data: RideDraft::default(),
            is_submitting: false,
            error: None,
            submitted_record_id: None,
        }
    }

    /// Moves to `step` and makes the history the linear path that leads to it.
    pub(crate) fn land_on(&mut self, step: WizardStep) {
        self.current_step = step;
        self.step_history = linear_history(step);
        self.error = None;
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::initial()
    }
}

/// The steps visited when walking forward from the first step to `step`.
pub fn linear_history(step: WizardStep) -> Vec<WizardStep> {
    WizardStep::ALL[..=step.index()].to_vec()
}

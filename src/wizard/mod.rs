//! The external-ride registration wizard: step registry, rules, state and
//! the controller that ties them together.

pub mod controller;
pub mod state;
pub mod step;
pub mod validation;

pub use controller::{WizardController, CONNECTION_ERROR_MESSAGE, SUBMISSION_FAILED_MESSAGE};
pub use state::WizardState;
pub use step::{StepConfig, WizardStep};
pub use validation::{
    FieldIssue, RideSchema, StepValidation, StepValidator, ValidationError,
    GENERIC_VALIDATION_MESSAGE,
};

#![doc(test(attr(deny(warnings))))]

//! Ride Wizard drives the external-ride registration flow: a fixed, linear
//! sequence of data-entry steps with per-step validation and a final
//! whole-record check before the ride is handed to a submitter.

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod import;
pub mod storage;
pub mod submit;
pub mod utils;
pub mod wizard;

pub use domain::{
    DraftField, ExternalRideInput, PaymentMethod, RequestSource, RideDraft, TimeOfDay, TripReason,
};
pub use errors::{Result, WizardError};
pub use submit::{FormSubmitter, SubmitError, SubmitResponse};
pub use wizard::{
    RideSchema, StepConfig, StepValidation, StepValidator, ValidationError, WizardController,
    WizardState, WizardStep,
};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ride wizard tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}

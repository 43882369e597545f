#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use ride_wizard::{
    ExternalRideInput, FormSubmitter, PaymentMethod, RequestSource, RideDraft, SubmitError,
    SubmitResponse, TimeOfDay, TripReason, WizardController, WizardStep,
};

/// One submission seen by [`ScriptedSubmitter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitCall {
    pub entity_id: String,
    pub related_id: Option<String>,
    pub record: ExternalRideInput,
}

/// Replays queued outcomes in order and records every call. Once the queue
/// is empty every submission is accepted as `r1`.
#[derive(Default)]
pub struct ScriptedSubmitter {
    outcomes: Mutex<VecDeque<Result<SubmitResponse, SubmitError>>>,
    calls: Mutex<Vec<SubmitCall>>,
}

impl ScriptedSubmitter {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_outcomes(
        outcomes: impl IntoIterator<Item = Result<SubmitResponse, SubmitError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<SubmitCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl FormSubmitter for ScriptedSubmitter {
    async fn submit(
        &self,
        entity_id: &str,
        record: &ExternalRideInput,
        related_id: Option<&str>,
    ) -> Result<SubmitResponse, SubmitError> {
        self.calls.lock().push(SubmitCall {
            entity_id: entity_id.to_string(),
            related_id: related_id.map(str::to_string),
            record: record.clone(),
        });
        let outcome = self.outcomes.lock().pop_front();
        outcome.unwrap_or_else(|| {
            Ok(SubmitResponse::Accepted {
                record_id: "r1".into(),
            })
        })
    }
}

pub fn wizard(submitter: Arc<ScriptedSubmitter>) -> WizardController {
    WizardController::with_schema(submitter)
}

/// A draft that passes every step: cash, no tip, no comments.
pub fn complete_draft() -> RideDraft {
    RideDraft {
        date: Some("2024-06-01".into()),
        time: Some("14:30".into()),
        origin_address: Some("Cra 7 #12-30".into()),
        destination_address: Some("Calle 80 #45-10".into()),
        total_received: Some(15_000.0),
        payment_method: Some(PaymentMethod::Cash),
        request_source: Some(RequestSource::Whatsapp),
        trip_reason: Some(TripReason::Work),
        time_of_day: Some(TimeOfDay::Afternoon),
        is_recurring: Some(false),
        tip_received: Some(false),
        ..RideDraft::default()
    }
}

/// Fills the draft and walks forward until the confirmation step.
pub fn walk_to_confirmation(wizard: &WizardController, draft: RideDraft) {
    wizard.update_form_data(draft);
    while wizard.current_step() != WizardStep::Confirmation {
        assert!(
            wizard.go_to_next_step(),
            "blocked at {}: {:?}",
            wizard.current_step(),
            wizard.validate_current_step().errors
        );
    }
}

//! Navigation, gating and submission for the external-ride wizard.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::RideDraft;
use crate::submit::{FormSubmitter, SubmitResponse};
use crate::wizard::state::{linear_history, WizardState};
use crate::wizard::step::{StepConfig, WizardStep};
use crate::wizard::validation::{RideSchema, StepValidation, StepValidator};

pub const SUBMISSION_FAILED_MESSAGE: &str = "No se pudo registrar la carrera. Intenta nuevamente.";
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Error de conexión. Verifica tu internet e intenta nuevamente.";

/// The visible state plus a counter bumped on every reset. A submission only
/// writes back while the generation it started under is still current.
#[derive(Debug)]
struct Session {
    state: WizardState,
    generation: u64,
}

/// Drives one form session. Clones share the same session state.
///
/// Every failure is absorbed into [`WizardState::error`]; no method returns
/// an error to the caller.
#[derive(Clone)]
pub struct WizardController {
    session: Arc<Mutex<Session>>,
    validator: Arc<dyn StepValidator>,
    submitter: Arc<dyn FormSubmitter>,
}

impl WizardController {
    pub fn new(validator: Arc<dyn StepValidator>, submitter: Arc<dyn FormSubmitter>) -> Self {
        Self {
            session: Arc::new(Mutex::new(Session {
                state: WizardState::initial(),
                generation: 0,
            })),
            validator,
            submitter,
        }
    }

    /// Controller using the default ride rules.
    pub fn with_schema(submitter: Arc<dyn FormSubmitter>) -> Self {
        Self::new(Arc::new(RideSchema), submitter)
    }

    pub fn state(&self) -> WizardState {
        self.session.lock().state.clone()
    }

    pub fn current_step(&self) -> WizardStep {
        self.session.lock().state.current_step
    }

    pub fn current_config(&self) -> StepConfig {
        self.current_step().config()
    }

    pub fn form_data(&self) -> RideDraft {
        self.session.lock().state.form_data.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.session.lock().state.error.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.session.lock().state.is_submitting
    }

    pub fn submitted_record_id(&self) -> Option<String> {
        self.session.lock().state.submitted_record_id.clone()
    }

    /// 1-based position among the data-entry steps and how many there are.
    pub fn progress(&self) -> (usize, usize) {
        let total = WizardStep::ALL
            .iter()
            .filter(|step| step.is_data_step())
            .count();
        let position = (self.current_step().index() + 1).min(total);
        (position, total)
    }

    /// Merges `patch` into the draft. Validation waits until navigation.
    pub fn update_form_data(&self, patch: RideDraft) {
        let mut session = self.session.lock();
        let state = &mut session.state;
        state.form_data.merge(patch);
        state.error = None;
    }

    /// Unsets the draft fields collected by `step`, e.g. to drop a comment
    /// typed earlier. The wizard does not move.
    pub fn clear_step_data(&self, step: WizardStep) {
        let mut session = self.session.lock();
        let state = &mut session.state;
        state.form_data.clear_fields(step.fields());
        state.error = None;
        debug!(step = %step, "cleared step data");
    }

    /// Merges a draft produced elsewhere (e.g. an imported receipt) without
    /// moving the wizard.
    pub fn prefill(&self, draft: RideDraft) {
        debug!(step = %self.current_step(), "prefilling wizard draft");
        self.update_form_data(draft);
    }

    /// Checks the current step's rules against the draft. Pure.
    pub fn validate_current_step(&self) -> StepValidation {
        let session = self.session.lock();
        self.validate_in(&session.state)
    }

    /// Whether [`Self::go_to_next_step`] would move. Data steps pass when
    /// skippable or valid. The confirmation and success screens always
    /// answer `false`: leaving confirmation forward is the job of
    /// [`Self::submit_form`], whatever the draft holds.
    pub fn can_go_next(&self) -> bool {
        let session = self.session.lock();
        self.can_go_next_in(&session.state)
    }

    pub fn can_go_back(&self) -> bool {
        can_go_back_in(&self.session.lock().state)
    }

    /// Advances one step when the current one is skippable or valid.
    /// Confirmation only moves forward through [`Self::submit_form`].
    pub fn go_to_next_step(&self) -> bool {
        let mut session = self.session.lock();
        let state = &mut session.state;
        let from = state.current_step;
        if !self.can_go_next_in(state) {
            debug!(step = %from, "forward navigation blocked");
            return false;
        }
        let Some(next) = from.next() else {
            return false;
        };
        state.current_step = next;
        state.step_history.push(next);
        state.error = None;
        debug!(from = %from, to = %next, "advanced wizard step");
        true
    }

    pub fn go_to_previous_step(&self) -> bool {
        let mut session = self.session.lock();
        let state = &mut session.state;
        if !can_go_back_in(state) {
            return false;
        }
        let from = state.current_step;
        let Some(previous) = from.previous() else {
            return false;
        };
        state.step_history.pop();
        if state.step_history.last() != Some(&previous) {
            state.step_history = linear_history(previous);
        }
        state.current_step = previous;
        state.error = None;
        debug!(from = %from, to = %previous, "returned to previous step");
        true
    }

    /// Jumps straight to `step`, e.g. to resume or to fix a field from the
    /// confirmation screen. Entering or leaving the success screen this way is
    /// refused.
    pub fn go_to_step(&self, step: WizardStep) -> bool {
        let mut session = self.session.lock();
        let state = &mut session.state;
        if step == WizardStep::Success || state.current_step == WizardStep::Success {
            debug!(from = %state.current_step, to = %step, "jump refused");
            return false;
        }
        state.land_on(step);
        debug!(to = %step, "jumped to step");
        true
    }

    /// Validates the whole draft and hands it to the submitter.
    ///
    /// Returns `true` once the ride is accepted and the wizard sits on the
    /// success screen. On any failure the wizard stays put with `error` set.
    /// Only one submission per session can be in flight; a concurrent call
    /// returns `false` without touching the state. A submission overtaken by
    /// [`Self::reset_form`] returns `false` and leaves the new session alone.
    pub async fn submit_form(&self, entity_id: &str, related_id: Option<&str>) -> bool {
        let (draft, generation) = {
            let mut guard = self.session.lock();
            let session = &mut *guard;
            let state = &mut session.state;
            if state.is_submitting {
                warn!(entity_id, "submission already in flight; ignoring duplicate");
                return false;
            }
            if state.current_step == WizardStep::Success {
                warn!(entity_id, "ride already submitted; reset before submitting again");
                return false;
            }
            state.is_submitting = true;
            state.error = None;
            (state.form_data.clone(), session.generation)
        };
        let _in_flight = InFlight {
            session: &self.session,
            generation,
        };

        let record = match self.validator.validate_record(&draft) {
            Ok(record) => record,
            Err(err) => {
                debug!(%err, "final validation refused the draft");
                self.fail(generation, err.messages().join(", "));
                return false;
            }
        };

        let outcome = self.submitter.submit(entity_id, &record, related_id).await;
        let mut session = self.session.lock();
        if session.generation != generation {
            warn!(entity_id, outcome = ?outcome, "form was reset during submission; result dropped");
            return false;
        }
        let state = &mut session.state;
        match outcome {
            Ok(SubmitResponse::Accepted { record_id }) => {
                info!(entity_id, record_id = %record_id, "external ride registered");
                state.current_step = WizardStep::Success;
                state.step_history.push(WizardStep::Success);
                state.submitted_record_id = Some(record_id);
                state.error = None;
                state.is_submitting = false;
                true
            }
            Ok(SubmitResponse::Rejected { message }) => {
                warn!(entity_id, reason = ?message, "submitter rejected the ride");
                state.error =
                    Some(message.unwrap_or_else(|| SUBMISSION_FAILED_MESSAGE.to_string()));
                state.is_submitting = false;
                false
            }
            Err(err) => {
                error!(entity_id, %err, "submitter failed");
                state.error = Some(CONNECTION_ERROR_MESSAGE.to_string());
                state.is_submitting = false;
                false
            }
        }
    }

    /// Back to a fresh session, whatever the current state. A submission
    /// still in flight becomes stale.
    pub fn reset_form(&self) {
        let mut session = self.session.lock();
        session.state = WizardState::initial();
        session.generation += 1;
        debug!(generation = session.generation, "wizard reset");
    }

    fn fail(&self, generation: u64, message: String) {
        let mut session = self.session.lock();
        if session.generation == generation {
            session.state.error = Some(message);
            session.state.is_submitting = false;
        }
    }

    fn validate_in(&self, state: &WizardState) -> StepValidation {
        self.validator
            .validate_step(state.current_step, &state.form_data)
            .into()
    }

    fn can_go_next_in(&self, state: &WizardState) -> bool {
        match state.current_step {
            WizardStep::Confirmation | WizardStep::Success => false,
            step => step.config().can_skip || self.validate_in(state).is_valid,
        }
    }
}

fn can_go_back_in(state: &WizardState) -> bool {
    state.current_step != WizardStep::first() && state.current_step != WizardStep::Success
}

/// Clears `is_submitting` when a submission ends, including when its future
/// is dropped before completing. Does nothing once the form was reset.
struct InFlight<'a> {
    session: &'a Mutex<Session>,
    generation: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut session = self.session.lock();
        if session.generation == self.generation {
            session.state.is_submitting = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExternalRideInput, PaymentMethod};
    use crate::submit::SubmitError;
    use async_trait::async_trait;

    struct Accepting;

    #[async_trait]
    impl FormSubmitter for Accepting {
        async fn submit(
            &self,
            _entity_id: &str,
            _record: &ExternalRideInput,
            _related_id: Option<&str>,
        ) -> Result<SubmitResponse, SubmitError> {
            Ok(SubmitResponse::Accepted {
                record_id: "r1".into(),
            })
        }
    }

    fn controller() -> WizardController {
        WizardController::with_schema(Arc::new(Accepting))
    }

    #[test]
    fn next_is_blocked_until_step_is_valid() {
        let wizard = controller();
        assert!(!wizard.can_go_next());
        assert!(!wizard.go_to_next_step());
        assert_eq!(wizard.current_step(), WizardStep::Datetime);

        wizard.update_form_data(RideDraft {
            date: Some("2024-06-01".into()),
            time: Some("14:30".into()),
            ..RideDraft::default()
        });
        assert!(wizard.go_to_next_step());
        assert_eq!(wizard.current_step(), WizardStep::Origin);
        assert_eq!(
            wizard.state().step_history,
            vec![WizardStep::Datetime, WizardStep::Origin]
        );
    }

    #[test]
    fn back_is_refused_on_first_step() {
        let wizard = controller();
        assert!(!wizard.can_go_back());
        assert!(!wizard.go_to_previous_step());
        assert_eq!(wizard.state(), WizardState::initial());
    }

    #[test]
    fn comments_step_never_blocks() {
        let wizard = controller();
        assert!(wizard.go_to_step(WizardStep::Comments));
        assert!(wizard.can_go_next());
        assert!(wizard.go_to_next_step());
        assert_eq!(wizard.current_step(), WizardStep::Confirmation);
        assert!(!wizard.can_go_next());
        assert!(!wizard.go_to_next_step());
    }

    #[test]
    fn confirmation_never_advances_even_with_a_complete_draft() {
        let wizard = controller();
        wizard.update_form_data(RideDraft {
            date: Some("2024-06-01".into()),
            time: Some("14:30".into()),
            origin_address: Some("Cable Plaza".into()),
            destination_address: Some("Aeropuerto La Nubia".into()),
            total_received: Some(15_000.0),
            payment_method: Some(PaymentMethod::Cash),
            request_source: Some(crate::domain::RequestSource::Whatsapp),
            trip_reason: Some(crate::domain::TripReason::Personal),
            time_of_day: Some(crate::domain::TimeOfDay::Afternoon),
            is_recurring: Some(false),
            tip_received: Some(false),
            ..RideDraft::default()
        });
        wizard.go_to_step(WizardStep::Confirmation);
        assert!(!wizard.can_go_next());
        assert!(!wizard.go_to_next_step());
        assert_eq!(wizard.current_step(), WizardStep::Confirmation);
    }

    #[test]
    fn jumping_to_success_is_refused() {
        let wizard = controller();
        assert!(!wizard.go_to_step(WizardStep::Success));
        assert_eq!(wizard.current_step(), WizardStep::Datetime);
    }

    #[test]
    fn progress_counts_data_steps() {
        let wizard = controller();
        assert_eq!(wizard.progress(), (1, 11));
        wizard.go_to_step(WizardStep::Confirmation);
        assert_eq!(wizard.progress(), (11, 11));
    }

    #[test]
    fn update_clears_previous_error() {
        let wizard = controller();
        wizard.session.lock().state.error = Some("previous failure".into());
        wizard.update_form_data(RideDraft {
            payment_method: Some(PaymentMethod::Nequi),
            ..RideDraft::default()
        });
        assert!(wizard.error().is_none());
        assert_eq!(wizard.form_data().payment_method, Some(PaymentMethod::Nequi));
    }

    #[tokio::test]
    async fn submit_refuses_while_in_flight() {
        let wizard = controller();
        wizard.session.lock().state.is_submitting = true;
        assert!(!wizard.submit_form("driver-1", None).await);
        let state = wizard.state();
        assert!(state.is_submitting, "in-flight flag belongs to the first call");
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn incomplete_draft_is_not_submitted() {
        let wizard = controller();
        wizard.go_to_step(WizardStep::Confirmation);
        assert!(!wizard.submit_form("driver-1", None).await);
        let state = wizard.state();
        assert_eq!(state.current_step, WizardStep::Confirmation);
        assert!(!state.is_submitting);
        assert!(state.error.is_some());
    }

    #[test]
    fn reset_bumps_generation_and_keeps_state_fresh() {
        let wizard = controller();
        wizard.go_to_step(WizardStep::Fare);
        wizard.reset_form();
        wizard.reset_form();
        assert_eq!(wizard.session.lock().generation, 2);
        assert_eq!(wizard.state(), WizardState::initial());
    }

    #[test]
    fn clearing_step_data_unsets_only_that_step() {
        let wizard = controller();
        wizard.update_form_data(RideDraft {
            tip_received: Some(true),
            tip_amount: Some(2_000.0),
            comments: Some("Buen viaje".into()),
            ..RideDraft::default()
        });
        wizard.clear_step_data(WizardStep::Comments);
        let draft = wizard.form_data();
        assert!(draft.comments.is_none());
        assert_eq!(draft.tip_amount, Some(2_000.0));

        wizard.clear_step_data(WizardStep::Tip);
        assert!(wizard.form_data().is_empty());
    }
}

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use crate::cli::answers::{parse_answer, Answer};
use crate::cli::args::CliArgs;
use crate::cli::output;
use crate::cli::prompter::{CliMode, DialoguerPrompter, Prompter, ScriptPrompter};
use crate::cli::{CliError, SCRIPT_MODE_ENV};
use crate::config::ConfigManager;
use crate::domain::{Displayable, RideDraft};
use crate::format::format_cop;
use crate::import::{import_rides, load_receipt, load_receipts, ExtractedRide};
use crate::storage::JsonRideStore;
use crate::utils::build_info;
use crate::wizard::{WizardController, WizardStep};

pub fn run_cli() -> Result<(), CliError> {
    run_with(CliArgs::parse())
}

/// Runs the driver with already-parsed arguments, reading answers from the
/// terminal or, when [`SCRIPT_MODE_ENV`] is set, from stdin lines.
pub fn run_with(args: CliArgs) -> Result<(), CliError> {
    if args.version {
        println!("{}", build_info::current().summary());
        return Ok(());
    }
    let mode = if std::env::var_os(SCRIPT_MODE_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let prompter: Box<dyn Prompter> = match mode {
        CliMode::Interactive => Box::<DialoguerPrompter>::default(),
        CliMode::Script => {
            colored::control::set_override(false);
            Box::new(ScriptPrompter::new(io::stdin().lock()))
        }
    };
    run_with_prompter(args, prompter).map(|_| ())
}

/// Runs one session against `prompter` and returns how many rides were
/// registered. The driver and vehicle are remembered once a ride is stored.
pub fn run_with_prompter(
    args: CliArgs,
    mut prompter: Box<dyn Prompter>,
) -> Result<usize, CliError> {
    let manager = ConfigManager::with_base_dir(args.data_dir.clone());
    let mut config = manager.load()?;

    let driver_id = args
        .driver
        .clone()
        .or_else(|| config.last_driver_id.clone())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CliError::Input("no driver given; pass --driver <id>".into()))?;
    let vehicle_id = args
        .vehicle
        .clone()
        .or_else(|| config.last_vehicle_id.clone());

    let store_root = args.data_dir.clone().or_else(|| config.data_dir.clone());
    let store = Arc::new(JsonRideStore::new(store_root)?);
    debug!(rides_dir = %store.rides_dir().display(), "ride store opened");

    if !args.import.is_empty() {
        let imported = import_receipts(
            &store,
            &driver_id,
            vehicle_id.as_deref(),
            &args.import,
            prompter.as_mut(),
        )?;
        if imported > 0 {
            config.remember_session(&driver_id, vehicle_id.as_deref());
            manager.save(&config)?;
        }
        return Ok(imported);
    }

    let controller = WizardController::with_schema(store);
    if let Some(path) = &args.prefill {
        prefill_from_receipt(&controller, path)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    info!(driver_id = %driver_id, "wizard session started");
    let mut session = Session {
        controller,
        prompter,
        runtime,
        driver_id,
        vehicle_id,
    };
    let registered = session.run()?;
    info!(registered, "wizard session finished");

    if registered > 0 {
        config.remember_session(&session.driver_id, session.vehicle_id.as_deref());
        manager.save(&config)?;
    }
    Ok(registered)
}

fn prefill_from_receipt(controller: &WizardController, path: &Path) -> Result<(), CliError> {
    let ride = load_receipt(path)?;
    match ride.to_draft() {
        Ok(draft) => {
            controller.prefill(draft);
            output::info(format!(
                "Datos tomados del comprobante (confianza {:.0} %).",
                ride.extraction_confidence * 100.0
            ));
        }
        Err(err) => output::warning(err),
    }
    Ok(())
}

/// Steps whose answers receipts never carry; asked once per import.
const IMPORT_DEFAULT_STEPS: [WizardStep; 6] = [
    WizardStep::Origin,
    WizardStep::RequestSource,
    WizardStep::TripReason,
    WizardStep::IsRecurring,
    WizardStep::PaymentMethod,
    WizardStep::Tip,
];

fn import_receipts(
    store: &JsonRideStore,
    driver_id: &str,
    vehicle_id: Option<&str>,
    paths: &[PathBuf],
    prompter: &mut dyn Prompter,
) -> Result<usize, CliError> {
    let batch = load_receipts(paths);
    output::section("Importar comprobantes");
    for failure in &batch.errors {
        output::warning(format!("{}: {}", failure.path.display(), failure.error));
    }
    output::info(format!(
        "{} de {} comprobantes leídos (confianza media {:.0} %).",
        batch.summary.successful,
        batch.summary.total_files,
        batch.summary.average_confidence * 100.0
    ));
    if !batch.is_success() {
        return Ok(0);
    }

    let Some(defaults) = ask_import_defaults(prompter)? else {
        output::info("Importación cancelada.");
        return Ok(0);
    };
    let (sources, rides): (Vec<PathBuf>, Vec<ExtractedRide>) = batch
        .rides
        .into_iter()
        .map(|loaded| (loaded.path, loaded.ride))
        .unzip();
    let report = import_rides(store, driver_id, vehicle_id, &rides, &defaults)?;
    for skipped in &report.skipped {
        let source = sources
            .get(skipped.index)
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        output::warning(format!("{source} omitido: {}", skipped.reason));
    }
    if report.is_success() {
        output::success(format!("{} carreras registradas.", report.imported.len()));
    }
    Ok(report.imported.len())
}

/// Values shared by every imported ride. `None` when the driver quits.
fn ask_import_defaults(prompter: &mut dyn Prompter) -> Result<Option<RideDraft>, CliError> {
    output::info("Datos comunes para todas las carreras (Enter para omitir).");
    let mut defaults = RideDraft::new();
    for step in IMPORT_DEFAULT_STEPS {
        loop {
            output::prompt(step.config().question);
            match parse_answer(step, &prompter.answer(step)?) {
                Ok(Answer::Patch(patch)) => {
                    defaults.merge(patch);
                    break;
                }
                Ok(Answer::Quit) => return Ok(None),
                Ok(Answer::Continue | Answer::Clear | Answer::Back) => break,
                Err(message) => output::warning(message),
            }
        }
    }
    Ok(Some(defaults))
}

struct Session {
    controller: WizardController,
    prompter: Box<dyn Prompter>,
    runtime: Runtime,
    driver_id: String,
    vehicle_id: Option<String>,
}

impl Session {
    fn run(&mut self) -> Result<usize, CliError> {
        let mut registered = 0;
        loop {
            let step = self.controller.current_step();
            match step {
                WizardStep::Success => {
                    registered += 1;
                    output::success(format!(
                        "{} Referencia: {}",
                        step.config().question,
                        self.controller.submitted_record_id().unwrap_or_default()
                    ));
                    if self.prompter.confirm("¿Registrar otra carrera?", false)? {
                        self.controller.reset_form();
                        continue;
                    }
                    return Ok(registered);
                }
                WizardStep::Confirmation => {
                    output::section(step.config().question);
                    output::summary(&self.controller.form_data());
                }
                _ => {
                    let (position, total) = self.controller.progress();
                    output::step_header(position, total, step.config().question);
                    if let Some(value) = current_value(step, &self.controller.form_data()) {
                        output::info(format!("Valor actual: {value}"));
                    }
                }
            }

            let raw = self.prompter.answer(step)?;
            match parse_answer(step, &raw) {
                Err(message) => output::warning(message),
                Ok(Answer::Quit) => {
                    output::info("Registro cancelado.");
                    return Ok(registered);
                }
                Ok(Answer::Back) => {
                    if !self.controller.go_to_previous_step() {
                        output::warning("Ya estás en el primer paso.");
                    }
                }
                Ok(Answer::Clear) => {
                    self.controller.clear_step_data(step);
                    output::info("Valor borrado.");
                }
                Ok(Answer::Continue) if step == WizardStep::Confirmation => self.submit(),
                Ok(Answer::Continue) => self.advance(),
                Ok(Answer::Patch(patch)) => {
                    self.controller.update_form_data(patch);
                    self.advance();
                }
            }
        }
    }

    fn advance(&self) {
        if !self.controller.go_to_next_step() {
            for message in self.controller.validate_current_step().errors {
                output::warning(message);
            }
        }
    }

    fn submit(&self) {
        let accepted = self.runtime.block_on(
            self.controller
                .submit_form(&self.driver_id, self.vehicle_id.as_deref()),
        );
        if !accepted {
            if let Some(message) = self.controller.error() {
                output::error(message);
            }
        }
    }
}

/// What the draft already holds for `step`, formatted for display.
fn current_value(step: WizardStep, draft: &RideDraft) -> Option<String> {
    fn label<T: Displayable>(value: Option<T>) -> Option<String> {
        value.map(|option| option.display_label())
    }
    fn yes_no(flag: bool) -> String {
        let text = if flag { "Sí" } else { "No" };
        text.to_string()
    }

    match step {
        WizardStep::Datetime => match (&draft.date, &draft.time) {
            (Some(date), Some(time)) => Some(format!("{date} {time}")),
            (date, time) => date.clone().or_else(|| time.clone()),
        },
        WizardStep::Origin => draft.origin_address.clone(),
        WizardStep::Destination => draft.destination_address.clone(),
        WizardStep::Fare => draft.total_received.map(format_cop),
        WizardStep::RequestSource => label(draft.request_source),
        WizardStep::TripReason => label(draft.trip_reason),
        WizardStep::TimeOfDay => label(draft.time_of_day),
        WizardStep::PaymentMethod => label(draft.payment_method),
        WizardStep::IsRecurring => draft.is_recurring.map(yes_no),
        WizardStep::Tip => match (draft.tip_received, draft.tip_amount) {
            (Some(true), Some(amount)) => Some(format_cop(amount)),
            (Some(flag), _) => Some(yes_no(flag)),
            (None, _) => None,
        },
        WizardStep::Comments => draft.comments.clone(),
        WizardStep::Confirmation | WizardStep::Success => None,
    }
}

//! Field rules shared by the per-step gate and the whole-record check.
//!
//! Both phases run the same rule functions, so a message shown while moving
//! between steps is identical to the one shown when a submission is refused.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::domain::{ExternalRideInput, RideDraft};
use crate::format::format_cop;
use crate::wizard::step::WizardStep;

pub const MIN_ADDRESS_CHARS: usize = 3;
pub const MAX_ADDRESS_CHARS: usize = 500;
pub const MIN_TOTAL_RECEIVED: f64 = 1_000.0;
pub const MAX_TOTAL_RECEIVED: f64 = 10_000_000.0;
pub const MAX_TIP_AMOUNT: f64 = 1_000_000.0;
pub const MAX_COMMENT_CHARS: usize = 1_000;

/// Message used whenever a draft cannot be checked at all.
pub const GENERIC_VALIDATION_MESSAGE: &str = "No fue posible validar los datos. Revisa la información e intenta de nuevo.";

/// A single failed field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Why a step or record was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more field rules failed; each issue carries a user-facing message.
    #[error("{}", join_messages(.0))]
    Rules(Vec<FieldIssue>),
    /// The draft held something the rules cannot evaluate.
    #[error("schema check failed: {0}")]
    Schema(String),
}

impl ValidationError {
    /// User-facing messages; a schema failure collapses to one generic message.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationError::Rules(issues) => {
                issues.iter().map(|issue| issue.message.clone()).collect()
            }
            ValidationError::Schema(_) => vec![GENERIC_VALIDATION_MESSAGE.to_string()],
        }
    }
}

fn join_messages(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of checking the current step, as exposed to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl StepValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }
}

impl From<Result<(), ValidationError>> for StepValidation {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => StepValidation::valid(),
            Err(err) => StepValidation {
                is_valid: false,
                errors: err.messages(),
            },
        }
    }
}

/// Validates drafts one step at a time and as a whole record.
pub trait StepValidator: Send + Sync {
    fn validate_step(&self, step: WizardStep, draft: &RideDraft) -> Result<(), ValidationError>;

    fn validate_record(&self, draft: &RideDraft) -> Result<ExternalRideInput, ValidationError>;
}

/// Default rule set for external rides.
#[derive(Debug, Clone, Copy, Default)]
pub struct RideSchema;

impl StepValidator for RideSchema {
    fn validate_step(&self, step: WizardStep, draft: &RideDraft) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        check_step(step, draft, &mut issues)?;
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Rules(issues))
        }
    }

    fn validate_record(&self, draft: &RideDraft) -> Result<ExternalRideInput, ValidationError> {
        let mut issues = Vec::new();
        for step in WizardStep::ALL.iter().copied().filter(|s| s.is_data_step()) {
            check_step(step, draft, &mut issues)?;
        }
        if !issues.is_empty() {
            return Err(ValidationError::Rules(issues));
        }
        build_record(draft)
    }
}

fn check_step(
    step: WizardStep,
    draft: &RideDraft,
    issues: &mut Vec<FieldIssue>,
) -> Result<(), ValidationError> {
    match step {
        WizardStep::Datetime => {
            check_date(draft.date.as_deref(), issues);
            check_time(draft.time.as_deref(), issues);
        }
        WizardStep::Origin => check_address(
            "origin_address",
            "origen",
            draft.origin_address.as_deref(),
            issues,
        ),
        WizardStep::Destination => check_address(
            "destination_address",
            "destino",
            draft.destination_address.as_deref(),
            issues,
        ),
        WizardStep::Fare => check_total_received(draft.total_received, issues)?,
        WizardStep::RequestSource => require(
            "request_source",
            draft.request_source.is_some(),
            "Selecciona cómo te solicitaron la carrera",
            issues,
        ),
        WizardStep::TripReason => require(
            "trip_reason",
            draft.trip_reason.is_some(),
            "Selecciona el motivo del viaje",
            issues,
        ),
        WizardStep::TimeOfDay => require(
            "time_of_day",
            draft.time_of_day.is_some(),
            "Selecciona el momento del día",
            issues,
        ),
        WizardStep::IsRecurring => require(
            "is_recurring",
            draft.is_recurring.is_some(),
            "Indica si es un cliente recurrente",
            issues,
        ),
        WizardStep::PaymentMethod => require(
            "payment_method",
            draft.payment_method.is_some(),
            "Selecciona el medio de pago",
            issues,
        ),
        WizardStep::Tip => check_tip(draft.tip_received, draft.tip_amount, issues)?,
        WizardStep::Comments => check_comments(draft.comments.as_deref(), issues),
        WizardStep::Confirmation | WizardStep::Success => {}
    }
    Ok(())
}

fn require(field: &'static str, present: bool, message: &str, issues: &mut Vec<FieldIssue>) {
    if !present {
        issues.push(FieldIssue::new(field, message));
    }
}

fn check_date(value: Option<&str>, issues: &mut Vec<FieldIssue>) {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => issues.push(FieldIssue::new("date", "Selecciona la fecha de la carrera")),
        Some(raw) => {
            if raw.len() != 10 || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
                issues.push(FieldIssue::new(
                    "date",
                    "La fecha debe tener el formato AAAA-MM-DD",
                ));
            }
        }
    }
}

fn check_time(value: Option<&str>, issues: &mut Vec<FieldIssue>) {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => issues.push(FieldIssue::new("time", "Selecciona la hora de la carrera")),
        Some(raw) => {
            if raw.len() != 5 || NaiveTime::parse_from_str(raw, "%H:%M").is_err() {
                issues.push(FieldIssue::new(
                    "time",
                    "La hora debe tener el formato HH:mm (24 horas)",
                ));
            }
        }
    }
}

fn check_address(
    field: &'static str,
    label: &str,
    value: Option<&str>,
    issues: &mut Vec<FieldIssue>,
) {
    let Some(raw) = value else {
        issues.push(FieldIssue::new(
            field,
            format!("Ingresa la dirección de {}", label),
        ));
        return;
    };
    let chars = raw.trim().chars().count();
    if chars < MIN_ADDRESS_CHARS {
        issues.push(FieldIssue::new(
            field,
            format!(
                "La dirección de {} debe tener al menos {} caracteres",
                label, MIN_ADDRESS_CHARS
            ),
        ));
    } else if chars > MAX_ADDRESS_CHARS {
        issues.push(FieldIssue::new(
            field,
            format!(
                "La dirección de {} no puede superar {} caracteres",
                label, MAX_ADDRESS_CHARS
            ),
        ));
    }
}

fn check_total_received(
    value: Option<f64>,
    issues: &mut Vec<FieldIssue>,
) -> Result<(), ValidationError> {
    let Some(amount) = value else {
        issues.push(FieldIssue::new(
            "total_received",
            "Ingresa el valor que recibiste",
        ));
        return Ok(());
    };
    if !amount.is_finite() {
        return Err(ValidationError::Schema(format!(
            "total_received is not a finite number: {}",
            amount
        )));
    }
    if amount < MIN_TOTAL_RECEIVED {
        issues.push(FieldIssue::new(
            "total_received",
            format!("El valor mínimo es {}", format_cop(MIN_TOTAL_RECEIVED)),
        ));
    } else if amount > MAX_TOTAL_RECEIVED {
        issues.push(FieldIssue::new(
            "total_received",
            format!("El valor máximo es {}", format_cop(MAX_TOTAL_RECEIVED)),
        ));
    }
    Ok(())
}

fn check_tip(
    received: Option<bool>,
    amount: Option<f64>,
    issues: &mut Vec<FieldIssue>,
) -> Result<(), ValidationError> {
    match received {
        None => issues.push(FieldIssue::new(
            "tip_received",
            "Indica si recibiste propina",
        )),
        Some(false) => {}
        Some(true) => match amount {
            None => issues.push(FieldIssue::new(
                "tip_amount",
                "Ingresa el monto de la propina",
            )),
            Some(value) if !value.is_finite() => {
                return Err(ValidationError::Schema(format!(
                    "tip_amount is not a finite number: {}",
                    value
                )));
            }
            Some(value) if !(0.0..=MAX_TIP_AMOUNT).contains(&value) => {
                issues.push(FieldIssue::new(
                    "tip_amount",
                    format!(
                        "El monto de la propina debe estar entre {} y {}",
                        format_cop(0.0),
                        format_cop(MAX_TIP_AMOUNT)
                    ),
                ))
            }
            Some(_) => {}
        },
    }
    Ok(())
}

fn check_comments(value: Option<&str>, issues: &mut Vec<FieldIssue>) {
    if let Some(text) = value {
        if text.chars().count() > MAX_COMMENT_CHARS {
            issues.push(FieldIssue::new(
                "comments",
                format!(
                    "Los comentarios no pueden superar {} caracteres",
                    MAX_COMMENT_CHARS
                ),
            ));
        }
    }
}

/// Assembles the record once every rule passed.
fn build_record(draft: &RideDraft) -> Result<ExternalRideInput, ValidationError> {
    fn present<T: Clone>(value: &Option<T>, field: &str) -> Result<T, ValidationError> {
        value
            .clone()
            .ok_or_else(|| ValidationError::Schema(format!("{} missing after validation", field)))
    }

    let tip_received = present(&draft.tip_received, "tip_received")?;
    Ok(ExternalRideInput {
        date: present(&draft.date, "date")?.trim().to_string(),
        time: present(&draft.time, "time")?.trim().to_string(),
        origin_address: present(&draft.origin_address, "origin_address")?
            .trim()
            .to_string(),
        destination_address: present(&draft.destination_address, "destination_address")?
            .trim()
            .to_string(),
        total_received: present(&draft.total_received, "total_received")?,
        payment_method: present(&draft.payment_method, "payment_method")?,
        request_source: present(&draft.request_source, "request_source")?,
        trip_reason: present(&draft.trip_reason, "trip_reason")?,
        time_of_day: present(&draft.time_of_day, "time_of_day")?,
        is_recurring: present(&draft.is_recurring, "is_recurring")?,
        tip_received,
        tip_amount: if tip_received { draft.tip_amount } else { None },
        comments: draft
            .comments
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string),
    })
}

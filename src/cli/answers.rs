//! Turns a typed answer into a draft patch for the step being asked.
//!
//! Shape checks only: whether a value is acceptable is left to the
//! controller's validation so both input modes report the same messages.

use crate::domain::{
    parse_choice, Choice, PaymentMethod, RequestSource, RideDraft, TimeOfDay, TripReason,
};
use crate::format::parse_cop_amount;
use crate::wizard::WizardStep;

pub const BACK_COMMANDS: &[&str] = &["<", "atras", "atrás"];
pub const QUIT_COMMANDS: &[&str] = &["salir", "exit"];
pub const CLEAR_COMMANDS: &[&str] = &["-", "borrar"];
const YES: &[&str] = &["si", "sí", "s", "yes", "y"];
const NO: &[&str] = &["no", "n"];

#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Values to merge into the draft before moving on.
    Patch(RideDraft),
    /// Keep what the draft already holds and move on.
    Continue,
    /// Unset what the draft holds for the step and ask again.
    Clear,
    Back,
    Quit,
}

/// Options offered for steps answered by picking from a list, as
/// `(identifier, label)` pairs.
pub fn choice_options(step: WizardStep) -> Option<Vec<(&'static str, &'static str)>> {
    fn options<T: Choice>() -> Vec<(&'static str, &'static str)> {
        T::ALL
            .iter()
            .map(|option| (option.as_str(), option.label()))
            .collect()
    }

    match step {
        WizardStep::RequestSource => Some(options::<RequestSource>()),
        WizardStep::TripReason => Some(options::<TripReason>()),
        WizardStep::TimeOfDay => Some(options::<TimeOfDay>()),
        WizardStep::PaymentMethod => Some(options::<PaymentMethod>()),
        WizardStep::IsRecurring => Some(vec![("si", "Sí"), ("no", "No")]),
        _ => None,
    }
}

/// Short hint on the expected answer format.
pub fn answer_hint(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Datetime => "AAAA-MM-DD HH:mm",
        WizardStep::Fare => "valor en pesos, por ejemplo 15.000",
        WizardStep::Tip => "no, o el valor de la propina",
        WizardStep::Comments => "opcional, Enter para omitir, - para borrar",
        WizardStep::Confirmation => "Enter para enviar",
        _ => "",
    }
}

pub fn parse_answer(step: WizardStep, raw: &str) -> Result<Answer, String> {
    let text = raw.trim();
    let lowered = text.to_lowercase();
    if BACK_COMMANDS.contains(&lowered.as_str()) {
        return Ok(Answer::Back);
    }
    if QUIT_COMMANDS.contains(&lowered.as_str()) {
        return Ok(Answer::Quit);
    }
    if CLEAR_COMMANDS.contains(&lowered.as_str()) && step.is_data_step() {
        return Ok(Answer::Clear);
    }
    if text.is_empty() {
        return Ok(Answer::Continue);
    }

    let mut patch = RideDraft::new();
    match step {
        WizardStep::Datetime => {
            let mut parts = text.split_whitespace();
            patch.date = parts.next().map(str::to_string);
            patch.time = parts.next().map(str::to_string);
            if parts.next().is_some() {
                return Err("Escribe la fecha y la hora separadas por un espacio".into());
            }
        }
        WizardStep::Origin => patch.origin_address = Some(text.to_string()),
        WizardStep::Destination => patch.destination_address = Some(text.to_string()),
        WizardStep::Fare => {
            patch.total_received = Some(parse_amount(text)?);
        }
        WizardStep::RequestSource => patch.request_source = Some(pick(text)?),
        WizardStep::TripReason => patch.trip_reason = Some(pick(text)?),
        WizardStep::TimeOfDay => patch.time_of_day = Some(pick(text)?),
        WizardStep::PaymentMethod => patch.payment_method = Some(pick(text)?),
        WizardStep::IsRecurring => patch.is_recurring = Some(yes_no(&lowered)?),
        WizardStep::Tip => {
            let (flag, amount) = match lowered.split_once(char::is_whitespace) {
                Some((head, rest)) if YES.contains(&head) => (true, Some(rest.trim())),
                _ if NO.contains(&lowered.as_str()) => (false, None),
                _ if YES.contains(&lowered.as_str()) => (true, None),
                _ => (true, Some(text)),
            };
            patch.tip_received = Some(flag);
            if let Some(amount) = amount {
                patch.tip_amount = Some(parse_amount(amount)?);
            }
        }
        WizardStep::Comments => patch.comments = Some(text.to_string()),
        WizardStep::Confirmation => {
            return if lowered == "enviar" || YES.contains(&lowered.as_str()) {
                Ok(Answer::Continue)
            } else {
                Err("Escribe enviar, < para corregir o salir".into())
            };
        }
        WizardStep::Success => return Err("La carrera ya fue registrada".into()),
    }
    Ok(Answer::Patch(patch))
}

/// Parses a yes/no answer.
pub fn yes_no(lowered: &str) -> Result<bool, String> {
    if YES.contains(&lowered) {
        Ok(true)
    } else if NO.contains(&lowered) {
        Ok(false)
    } else {
        Err("Responde sí o no".into())
    }
}

fn parse_amount(text: &str) -> Result<f64, String> {
    parse_cop_amount(text).ok_or_else(|| "Escribe un valor numérico, por ejemplo 15.000".into())
}

/// Accepts an identifier, a label or a 1-based position in the option list.
fn pick<T: Choice>(text: &str) -> Result<T, String> {
    if let Ok(position) = text.parse::<usize>() {
        if let Some(option) = position.checked_sub(1).and_then(|index| T::ALL.get(index)) {
            return Ok(*option);
        }
    }
    parse_choice(text).ok_or_else(|| {
        let labels: Vec<&str> = T::ALL.iter().map(|option| option.label()).collect();
        format!("Opciones: {}", labels.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(step: WizardStep, raw: &str) -> RideDraft {
        match parse_answer(step, raw) {
            Ok(Answer::Patch(patch)) => patch,
            other => panic!("expected a patch for {raw:?}, got {other:?}"),
        }
    }

    #[test]
    fn commands_win_over_values() {
        assert_eq!(parse_answer(WizardStep::Origin, " < "), Ok(Answer::Back));
        assert_eq!(parse_answer(WizardStep::Fare, "SALIR"), Ok(Answer::Quit));
        assert_eq!(parse_answer(WizardStep::Comments, ""), Ok(Answer::Continue));
        assert_eq!(parse_answer(WizardStep::Comments, "-"), Ok(Answer::Clear));
        assert_eq!(parse_answer(WizardStep::Tip, "Borrar"), Ok(Answer::Clear));
        assert!(parse_answer(WizardStep::Confirmation, "-").is_err());
    }

    #[test]
    fn datetime_splits_date_and_time() {
        let draft = patch(WizardStep::Datetime, "2024-06-01 14:30");
        assert_eq!(draft.date.as_deref(), Some("2024-06-01"));
        assert_eq!(draft.time.as_deref(), Some("14:30"));
        assert!(parse_answer(WizardStep::Datetime, "2024-06-01 14:30 extra").is_err());
    }

    #[test]
    fn choices_accept_position_identifier_or_label() {
        assert_eq!(
            patch(WizardStep::PaymentMethod, "2").payment_method,
            Some(PaymentMethod::Nequi)
        );
        assert_eq!(
            patch(WizardStep::RequestSource, "whatsapp").request_source,
            Some(RequestSource::Whatsapp)
        );
        assert_eq!(
            patch(WizardStep::TripReason, "Trabajo").trip_reason,
            Some(TripReason::Work)
        );
        assert!(parse_answer(WizardStep::TimeOfDay, "9").is_err());
    }

    #[test]
    fn tip_answers() {
        let none = patch(WizardStep::Tip, "no");
        assert_eq!(none.tip_received, Some(false));
        assert_eq!(none.tip_amount, None);

        let with_amount = patch(WizardStep::Tip, "si 2.000");
        assert_eq!(with_amount.tip_received, Some(true));
        assert_eq!(with_amount.tip_amount, Some(2_000.0));

        let bare_amount = patch(WizardStep::Tip, "5000");
        assert_eq!(bare_amount.tip_received, Some(true));
        assert_eq!(bare_amount.tip_amount, Some(5_000.0));

        let missing_amount = patch(WizardStep::Tip, "sí");
        assert_eq!(missing_amount.tip_received, Some(true));
        assert_eq!(missing_amount.tip_amount, None);
    }

    #[test]
    fn fare_must_be_numeric() {
        assert_eq!(
            patch(WizardStep::Fare, "$ 15.000").total_received,
            Some(15_000.0)
        );
        assert!(parse_answer(WizardStep::Fare, "quince mil").is_err());
    }

    #[test]
    fn every_choice_step_lists_options() {
        assert_eq!(choice_options(WizardStep::PaymentMethod).unwrap().len(), 5);
        assert_eq!(choice_options(WizardStep::IsRecurring).unwrap().len(), 2);
        assert!(choice_options(WizardStep::Origin).is_none());
    }
}

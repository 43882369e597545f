//! The fixed, linear sequence of wizard steps and their display metadata.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DraftField;
use crate::errors::WizardError;

/// One screen of the external-ride wizard, in visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Datetime,
    Origin,
    Destination,
    Fare,
    RequestSource,
    TripReason,
    TimeOfDay,
    IsRecurring,
    PaymentMethod,
    Tip,
    Comments,
    Confirmation,
    Success,
}

/// Display and gating metadata for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepConfig {
    pub question: &'static str,
    pub required: bool,
    pub can_skip: bool,
}

impl StepConfig {
    const fn required(question: &'static str) -> Self {
        Self {
            question,
            required: true,
            can_skip: false,
        }
    }

    const fn optional(question: &'static str) -> Self {
        Self {
            question,
            required: false,
            can_skip: true,
        }
    }

    const fn screen(question: &'static str) -> Self {
        Self {
            question,
            required: false,
            can_skip: false,
        }
    }
}

impl WizardStep {
    pub const ALL: [WizardStep; 13] = [
        WizardStep::Datetime,
        WizardStep::Origin,
        WizardStep::Destination,
        WizardStep::Fare,
        WizardStep::RequestSource,
        WizardStep::TripReason,
        WizardStep::TimeOfDay,
        WizardStep::IsRecurring,
        WizardStep::PaymentMethod,
        WizardStep::Tip,
        WizardStep::Comments,
        WizardStep::Confirmation,
        WizardStep::Success,
    ];

    pub const fn first() -> Self {
        WizardStep::Datetime
    }

    pub const fn last() -> Self {
        WizardStep::Success
    }

    /// Position of the step in [`WizardStep::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Steps that collect ride data, i.e. everything before confirmation.
    pub fn is_data_step(self) -> bool {
        self.index() < WizardStep::Confirmation.index()
    }

    /// Record fields this step is responsible for; empty for the closing
    /// screens.
    pub fn fields(self) -> &'static [DraftField] {
        match self {
            WizardStep::Datetime => &[DraftField::Date, DraftField::Time],
            WizardStep::Origin => &[DraftField::OriginAddress],
            WizardStep::Destination => &[DraftField::DestinationAddress],
            WizardStep::Fare => &[DraftField::TotalReceived],
            WizardStep::RequestSource => &[DraftField::RequestSource],
            WizardStep::TripReason => &[DraftField::TripReason],
            WizardStep::TimeOfDay => &[DraftField::TimeOfDay],
            WizardStep::IsRecurring => &[DraftField::IsRecurring],
            WizardStep::PaymentMethod => &[DraftField::PaymentMethod],
            WizardStep::Tip => &[DraftField::TipReceived, DraftField::TipAmount],
            WizardStep::Comments => &[DraftField::Comments],
            WizardStep::Confirmation | WizardStep::Success => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::Datetime => "datetime",
            WizardStep::Origin => "origin",
            WizardStep::Destination => "destination",
            WizardStep::Fare => "fare",
            WizardStep::RequestSource => "request_source",
            WizardStep::TripReason => "trip_reason",
            WizardStep::TimeOfDay => "time_of_day",
            WizardStep::IsRecurring => "is_recurring",
            WizardStep::PaymentMethod => "payment_method",
            WizardStep::Tip => "tip",
            WizardStep::Comments => "comments",
            WizardStep::Confirmation => "confirmation",
            WizardStep::Success => "success",
        }
    }

    pub fn config(self) -> StepConfig {
        match self {
            WizardStep::Datetime => StepConfig::required("¿Cuándo fue la carrera?"),
            WizardStep::Origin => StepConfig::required("¿Dónde recogiste al pasajero?"),
            WizardStep::Destination => StepConfig::required("¿A dónde lo llevaste?"),
            WizardStep::Fare => StepConfig::required("¿Cuánto recibiste por la carrera?"),
            WizardStep::RequestSource => StepConfig::required("¿Cómo te solicitaron la carrera?"),
            WizardStep::TripReason => StepConfig::required("¿Cuál fue el motivo del viaje?"),
            WizardStep::TimeOfDay => StepConfig::required("¿En qué momento del día fue?"),
            WizardStep::IsRecurring => StepConfig::required("¿Es un cliente recurrente?"),
            WizardStep::PaymentMethod => StepConfig::required("¿Cómo te pagaron?"),
            WizardStep::Tip => StepConfig::required("¿Recibiste propina?"),
            WizardStep::Comments => StepConfig::optional("¿Algún comentario adicional?"),
            WizardStep::Confirmation => StepConfig::screen("Revisa los datos antes de enviar"),
            WizardStep::Success => StepConfig::screen("¡Carrera registrada!"),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WizardStep {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|step| step.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| WizardError::InvalidInput(format!("unknown wizard step `{}`", needle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_data_steps_collect_fields() {
        for step in WizardStep::ALL {
            assert_eq!(step.is_data_step(), !step.fields().is_empty(), "{step}");
        }
        assert_eq!(
            WizardStep::Tip.fields(),
            &[DraftField::TipReceived, DraftField::TipAmount]
        );
    }

    #[test]
    fn indices_follow_declaration_order() {
        for (position, step) in WizardStep::ALL.iter().enumerate() {
            assert_eq!(step.index(), position);
            assert_eq!(WizardStep::from_index(position), Some(*step));
        }
        assert_eq!(WizardStep::first().previous(), None);
        assert_eq!(WizardStep::last().next(), None);
        assert_eq!(WizardStep::Tip.next(), Some(WizardStep::Comments));
    }

    #[test]
    fn only_comments_can_be_skipped() {
        let skippable: Vec<_> = WizardStep::ALL
            .iter()
            .filter(|step| step.config().can_skip)
            .collect();
        assert_eq!(skippable, vec![&WizardStep::Comments]);
        assert!(!WizardStep::Comments.config().required);
        assert!(WizardStep::Fare.config().required);
    }

    #[test]
    fn parses_step_identifiers() {
        assert_eq!(
            "payment_method".parse::<WizardStep>().unwrap(),
            WizardStep::PaymentMethod
        );
        assert!("checkout".parse::<WizardStep>().is_err());
        assert_eq!(WizardStep::TimeOfDay.to_string(), "time_of_day");
    }

    #[test]
    fn data_steps_exclude_terminal_screens() {
        assert!(WizardStep::Comments.is_data_step());
        assert!(!WizardStep::Confirmation.is_data_step());
        assert!(!WizardStep::Success.is_data_step());
        assert!(WizardStep::Confirmation.fields().is_empty());
    }
}

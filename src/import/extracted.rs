//! What a ride receipt yields once its text has been parsed.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::domain::{PaymentMethod, RideDraft, TimeOfDay};
use crate::errors::{Result, WizardError};
use crate::format::format_cop;

/// Rounding slack, in pesos, tolerated by the consistency checks.
pub const AMOUNT_TOLERANCE: f64 = 1.0;
/// IVA charged on the platform's service fee.
pub const SERVICE_FEE_TAX_RATE: f64 = 0.19;
pub const DEFAULT_FEE_PERCENTAGE: f64 = 9.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Minutes,
    Hours,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RideDuration {
    pub value: u32,
    pub unit: DurationUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    Kilometers,
    Meters,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RideDistance {
    pub value: f64,
    pub unit: DistanceUnit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RideStatus {
    #[default]
    Completed,
    CancelledByPassenger,
    CancelledByDriver,
}

/// Per-field confidence in `0.0..=1.0`; zero means the field was not found.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldConfidences {
    pub date: f64,
    pub time: f64,
    pub destination_address: f64,
    pub duration: f64,
    pub distance: f64,
    pub passenger_name: f64,
    pub payment_method: f64,
    pub fare: f64,
    pub total_received: f64,
    pub service_fee: f64,
    pub service_fee_tax: f64,
    pub total_paid: f64,
    pub net_income: f64,
}

impl FieldConfidences {
    /// Mean of the non-zero scores of the fields that matter most.
    pub fn overall(&self) -> f64 {
        let found: Vec<f64> = [
            self.date,
            self.time,
            self.duration,
            self.distance,
            self.passenger_name,
            self.payment_method,
            self.net_income,
            self.fare,
            self.total_received,
        ]
        .into_iter()
        .filter(|score| *score > 0.0)
        .collect();
        if found.is_empty() {
            0.0
        } else {
            found.iter().sum::<f64>() / found.len() as f64
        }
    }
}

/// Structured data recovered from one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRide {
    pub date: Option<NaiveDate>,
    /// 24h `HH:MM`.
    pub time: Option<String>,
    pub destination_address: Option<String>,
    pub duration: Option<RideDuration>,
    pub distance: Option<RideDistance>,
    pub passenger_name: Option<String>,
    pub rating_given: Option<u8>,
    pub status: RideStatus,
    pub cancellation_reason: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_method_label: String,
    pub fare: f64,
    pub total_received: f64,
    pub service_fee: f64,
    pub fee_percentage: f64,
    pub service_fee_tax: f64,
    pub total_paid: f64,
    pub net_income: f64,
    pub field_confidences: FieldConfidences,
    pub extraction_confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

impl Default for ExtractedRide {
    fn default() -> Self {
        Self {
            date: None,
            time: None,
            destination_address: None,
            duration: None,
            distance: None,
            passenger_name: None,
            rating_given: None,
            status: RideStatus::Completed,
            cancellation_reason: None,
            payment_method: PaymentMethod::Other,
            payment_method_label: "Otro".into(),
            fare: 0.0,
            total_received: 0.0,
            service_fee: 0.0,
            fee_percentage: DEFAULT_FEE_PERCENTAGE,
            service_fee_tax: 0.0,
            total_paid: 0.0,
            net_income: 0.0,
            field_confidences: FieldConfidences::default(),
            extraction_confidence: 0.0,
            raw_text: None,
        }
    }
}

impl ExtractedRide {
    pub fn is_cancelled(&self) -> bool {
        self.status != RideStatus::Completed
    }

    /// Wizard draft seeded with what the receipt reliably provides.
    ///
    /// Cancelled rides earned nothing and cannot be registered.
    pub fn to_draft(&self) -> Result<RideDraft> {
        if self.is_cancelled() {
            return Err(WizardError::Import(
                "the receipt belongs to a cancelled ride".into(),
            ));
        }
        let hour = self
            .time
            .as_deref()
            .and_then(|raw| NaiveTime::parse_from_str(raw, "%H:%M").ok())
            .map(|time| time.hour());
        let amount = [self.total_received, self.fare]
            .into_iter()
            .find(|value| *value > 0.0);
        let payment_method = (self.payment_method != PaymentMethod::Other)
            .then_some(self.payment_method);

        Ok(RideDraft {
            date: self.date.map(|date| date.format("%Y-%m-%d").to_string()),
            time: self.time.clone(),
            time_of_day: hour.map(TimeOfDay::from_hour),
            destination_address: self.destination_address.clone(),
            total_received: amount,
            payment_method,
            ..RideDraft::default()
        })
    }
}

/// Cross-checks the receipt's amounts; an empty result means they add up.
pub fn check_financial_consistency(ride: &ExtractedRide) -> Vec<String> {
    let mut problems = Vec::new();
    let mut compare = |label: &str, expected: f64, found: f64| {
        if (found - expected).abs() > AMOUNT_TOLERANCE {
            problems.push(format!(
                "{} no cuadra: se esperaba {} y se leyó {}",
                label,
                format_cop(expected),
                format_cop(found)
            ));
        }
    };

    if ride.total_received > 0.0 && ride.total_paid > 0.0 {
        compare(
            "Mis ingresos",
            ride.total_received - ride.total_paid,
            ride.net_income,
        );
    }
    if ride.fare > 0.0 && ride.fee_percentage > 0.0 {
        compare(
            "La comisión",
            ride.fare * ride.fee_percentage / 100.0,
            ride.service_fee,
        );
    }
    if ride.service_fee > 0.0 {
        compare(
            "El IVA",
            ride.service_fee * SERVICE_FEE_TAX_RATE,
            ride.service_fee_tax,
        );
    }
    if ride.service_fee > 0.0 || ride.service_fee_tax > 0.0 {
        compare(
            "El total pagado",
            ride.service_fee + ride.service_fee_tax,
            ride.total_paid,
        );
    }
    problems
}

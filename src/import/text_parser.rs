//! Turns the recognized text of a ride-app receipt into an [`ExtractedRide`].
//!
//! Receipts are in Spanish (Colombia): dates like `mar, 2 dic 2025`, times
//! like `07:52 p.m.`, distances with a decimal comma and amounts tagged
//! `COP` on either side. Recognition noise is expected, so every field is
//! optional and carries a confidence score.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::domain::PaymentMethod;
use crate::format::{month_from_abbreviation, parse_cop_amount};
use crate::import::extracted::{
    DistanceUnit, DurationUnit, ExtractedRide, FieldConfidences, RideDistance, RideDuration,
    RideStatus,
};

/// Builds a pattern from a literal known to be valid.
fn pattern(source: &str) -> Regex {
    Regex::new(source).unwrap_or_else(|err| panic!("invalid receipt pattern {source:?}: {err}"))
}

static DATE: Lazy<Regex> = Lazy::new(|| {
    pattern(
        r"(?i)(?:(?:lun|mar|mi[eé]|jue|vie|s[aá]b|dom)[,.]?\s*)?(\d{1,2})\s+(ene|feb|mar|abr|may|jun|jul|ago|sep|oct|nov|dic)\.?\s+(\d{4})",
    )
});
static TIME: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)(\d{1,2}):(\d{2})\s*(a\.?\s?m\.?|p\.?\s?m\.?)"));
static DURATION: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)(\d+)\s*(min|hr)\b"));
static DISTANCE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)(\d+(?:[,. ]\d+)?)\s*(km|metros?)\b"));
static AMOUNT: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)COP\s*(\d[\d.,]*\d|\d)|(\d[\d.,]*\d|\d)\s*COP"));
static PERCENTAGE: Lazy<Regex> = Lazy::new(|| pattern(r"(\d+(?:[.,]\d+)?)\s*%"));
static CANCELLED_BY_PASSENGER: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)pasajero\s+cancel[oó]"));
static CANCELLED_BY_DRIVER: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)cancelaste"));
static PAYMENT_CASH: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)pago\s+en\s+efectivo"));
static PAYMENT_NEQUI: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)nequi"));
static ADDRESS_PREFIX: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?i)^(?:cl|cll|cra|kr|carrera|calle|av|avenida|universidad|edificio|centro)\b")
});
static ADDRESS_NUMBER: Lazy<Regex> = Lazy::new(|| pattern(r"#\s*\d+"));
static OCR_BULLET: Lazy<Regex> = Lazy::new(|| pattern(r"^[A-Z0-9]\)\s*"));
static PERSON_NAME: Lazy<Regex> = Lazy::new(|| {
    pattern(r"^[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)?$")
});
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| pattern(r"\n\s*\n+"));
static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| pattern(r"[^\S\n]+"));

/// Amount slots on the receipt, each introduced by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountSlot {
    NetIncome,
    Fare,
    TotalReceived,
    ServiceFee,
    ServiceFeeTax,
    TotalPaid,
}

static AMOUNT_LABELS: Lazy<Vec<(AmountSlot, Regex)>> = Lazy::new(|| {
    vec![
        (AmountSlot::NetIncome, pattern(r"(?i)mis\s+ingresos")),
        (AmountSlot::Fare, pattern(r"(?i)\btarifa\b")),
        (AmountSlot::TotalReceived, pattern(r"(?i)total\s+recibido")),
        (
            AmountSlot::ServiceFee,
            pattern(r"(?i)pagos?\s+por\s+el\s+servicio|comisi[oó]n|9[,.]5\s*%"),
        ),
        (AmountSlot::ServiceFeeTax, pattern(r"(?i)\biva\b")),
        (AmountSlot::TotalPaid, pattern(r"(?i)total\s+pagado")),
    ]
});

/// Lines that are receipt labels, never a passenger name.
const NAME_STOP_WORDS: &[&str] = &[
    "duración", "distancia", "recib", "pagu", "tarifa", "total", "calific", "soporte", "ingresos",
    "cop", "pago", "nequi", "efectivo", "iva", "servicio", "cancel", "viaje",
];

const DATE_CONFIDENCE: f64 = 0.95;
const TIME_CONFIDENCE: f64 = 0.95;
const MEASURE_CONFIDENCE: f64 = 0.9;
const AMOUNT_CONFIDENCE: f64 = 0.9;
const NAME_CONFIDENCE: f64 = 0.8;
const ADDRESS_CONFIDENCE: f64 = 0.7;

/// Parses receipt text. Never fails: missing fields stay empty and score zero.
pub fn parse_receipt(raw_text: &str) -> ExtractedRide {
    let text = clean_text(raw_text);
    let mut ride = ExtractedRide {
        raw_text: Some(raw_text.to_string()),
        ..ExtractedRide::default()
    };
    let mut confidences = FieldConfidences::default();

    if let Some(date) = parse_date(&text) {
        ride.date = Some(date);
        confidences.date = DATE_CONFIDENCE;
    }
    if let Some(time) = parse_time(&text) {
        ride.time = Some(time);
        confidences.time = TIME_CONFIDENCE;
    }
    if let Some(duration) = parse_duration(&text) {
        ride.duration = Some(duration);
        confidences.duration = MEASURE_CONFIDENCE;
    }
    if let Some(distance) = parse_distance(&text) {
        ride.distance = Some(distance);
        confidences.distance = MEASURE_CONFIDENCE;
    }

    ride.status = parse_status(&text);
    if ride.status == RideStatus::CancelledByPassenger {
        ride.cancellation_reason = Some("El pasajero canceló".into());
    } else if ride.status == RideStatus::CancelledByDriver {
        ride.cancellation_reason = Some("Cancelaste el viaje".into());
    }

    let (method, label, score) = parse_payment_method(&text);
    ride.payment_method = method;
    ride.payment_method_label = label.to_string();
    confidences.payment_method = score;

    if let Some(percentage) = PERCENTAGE
        .captures(&text)
        .and_then(|caps| parse_cop_amount(&caps[1]))
    {
        ride.fee_percentage = percentage;
    }
    for (slot, value) in assign_amounts(&text) {
        match slot {
            AmountSlot::NetIncome => ride.net_income = value,
            AmountSlot::Fare => ride.fare = value,
            AmountSlot::TotalReceived => ride.total_received = value,
            AmountSlot::ServiceFee => ride.service_fee = value,
            AmountSlot::ServiceFeeTax => ride.service_fee_tax = value,
            AmountSlot::TotalPaid => ride.total_paid = value,
        }
    }
    let found = |value: f64| if value > 0.0 { AMOUNT_CONFIDENCE } else { 0.0 };
    confidences.net_income = found(ride.net_income);
    confidences.fare = found(ride.fare);
    confidences.total_received = found(ride.total_received);
    confidences.service_fee = found(ride.service_fee);
    confidences.service_fee_tax = found(ride.service_fee_tax);
    confidences.total_paid = found(ride.total_paid);

    let (passenger, destination) = parse_passenger_and_destination(&text);
    if passenger.is_some() {
        confidences.passenger_name = NAME_CONFIDENCE;
    }
    if destination.is_some() {
        confidences.destination_address = ADDRESS_CONFIDENCE;
    }
    ride.passenger_name = passenger;
    ride.destination_address = destination;
    ride.rating_given = parse_rating(&text);

    ride.extraction_confidence = confidences.overall();
    ride.field_confidences = confidences;
    debug!(
        confidence = ride.extraction_confidence,
        status = ?ride.status,
        "parsed ride receipt"
    );
    ride
}

fn clean_text(text: &str) -> String {
    let text = BLANK_LINES.replace_all(text, "\n");
    let text = INLINE_SPACE.replace_all(&text, " ");
    text.trim().to_string()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = month_from_abbreviation(&caps[2])?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `07:52 p.m.` becomes `19:52`.
fn parse_time(text: &str) -> Option<String> {
    let caps = TIME.captures(text)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    if hour == 0 || hour > 12 || minute > 59 {
        return None;
    }
    let afternoon = caps[3].to_lowercase().starts_with('p');
    match (afternoon, hour) {
        (true, 12) => {}
        (true, _) => hour += 12,
        (false, 12) => hour = 0,
        (false, _) => {}
    }
    Some(format!("{:02}:{:02}", hour, minute))
}

fn parse_duration(text: &str) -> Option<RideDuration> {
    let caps = DURATION.captures(text)?;
    let value = caps[1].parse().ok()?;
    let unit = if caps[2].eq_ignore_ascii_case("hr") {
        DurationUnit::Hours
    } else {
        DurationUnit::Minutes
    };
    Some(RideDuration { value, unit })
}

/// Reads a distance, undoing the usual recognition slips on urban rides:
/// a dropped decimal comma (`59 km` for 5,9) or a misread one (`27.0 km`).
fn parse_distance(text: &str) -> Option<RideDistance> {
    let caps = DISTANCE.captures(text)?;
    let raw = &caps[1];
    let mut value: f64 = raw.replace([',', ' '], ".").parse().ok()?;
    let unit = if caps[2].to_lowercase().starts_with("metro") {
        DistanceUnit::Meters
    } else {
        DistanceUnit::Kilometers
    };
    if unit == DistanceUnit::Kilometers {
        let has_separator = raw.contains([',', '.', ' ']);
        if value >= 20.0 || (value >= 10.0 && !has_separator) {
            debug!(raw, corrected = value / 10.0, "corrected implausible ride distance");
            value /= 10.0;
        }
    }
    Some(RideDistance { value, unit })
}

fn parse_status(text: &str) -> RideStatus {
    if CANCELLED_BY_PASSENGER.is_match(text) {
        RideStatus::CancelledByPassenger
    } else if CANCELLED_BY_DRIVER.is_match(text) {
        RideStatus::CancelledByDriver
    } else {
        RideStatus::Completed
    }
}

fn parse_payment_method(text: &str) -> (PaymentMethod, &'static str, f64) {
    if PAYMENT_NEQUI.is_match(text) {
        (PaymentMethod::Nequi, "Nequi", 0.95)
    } else if PAYMENT_CASH.is_match(text) {
        (PaymentMethod::Cash, "Pago en efectivo", 0.95)
    } else {
        (PaymentMethod::Other, "Otro", 0.5)
    }
}

/// Gives each amount to the closest label before it that has no amount yet.
fn assign_amounts(text: &str) -> Vec<(AmountSlot, f64)> {
    let labels: Vec<(AmountSlot, usize)> = AMOUNT_LABELS
        .iter()
        .filter_map(|(slot, regex)| regex.find(text).map(|found| (*slot, found.start())))
        .collect();
    let mut assigned: Vec<(AmountSlot, f64)> = Vec::new();

    for caps in AMOUNT.captures_iter(text) {
        let Some(value) = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|digits| parse_cop_amount(digits.as_str()))
        else {
            continue;
        };
        let position = caps.get(0).map_or(0, |whole| whole.start());
        let slot = labels
            .iter()
            .filter(|(slot, start)| {
                *start < position && !assigned.iter().any(|(taken, _)| taken == slot)
            })
            .max_by_key(|(_, start)| *start)
            .map(|(slot, _)| *slot);
        if let Some(slot) = slot {
            assigned.push((slot, value));
        }
    }
    assigned
}

fn parse_passenger_and_destination(text: &str) -> (Option<String>, Option<String>) {
    let mut passenger = None;
    let mut destination = None;

    for line in text.lines().map(str::trim) {
        if line.chars().count() < 2 {
            continue;
        }
        if destination.is_none() && (ADDRESS_PREFIX.is_match(line) || ADDRESS_NUMBER.is_match(line))
        {
            destination = Some(line.to_string());
            continue;
        }
        if passenger.is_some() {
            continue;
        }
        let lowered = line.to_lowercase();
        if NAME_STOP_WORDS.iter().any(|word| lowered.contains(word)) {
            continue;
        }
        let candidate = OCR_BULLET.replace(line, "");
        let candidate = candidate.trim();
        if candidate.chars().count() > 3 && PERSON_NAME.is_match(candidate) {
            passenger = Some(candidate.to_string());
        }
    }
    (passenger, destination)
}

fn parse_rating(text: &str) -> Option<u8> {
    let stars = text.chars().filter(|ch| matches!(ch, '★' | '⭐')).count();
    if stars > 0 {
        return Some(stars.min(5) as u8);
    }
    text.to_lowercase().contains("calificaste").then_some(5)
}

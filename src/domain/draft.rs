//! The partially filled ride ("draft") and the validated record it becomes.

use serde::{Deserialize, Serialize};

use crate::domain::common::Displayable;
use crate::domain::ride::{PaymentMethod, RequestSource, TimeOfDay, TripReason};
use crate::format::{format_cop, format_date_es};

/// Fields accumulated across wizard steps. Every field stays optional until
/// the whole-record check at submission time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RideDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_received: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_source: Option<RequestSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_reason: Option<TripReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_received: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Names one field of a [`RideDraft`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Date,
    Time,
    OriginAddress,
    DestinationAddress,
    TotalReceived,
    PaymentMethod,
    RequestSource,
    TripReason,
    TimeOfDay,
    IsRecurring,
    TipReceived,
    TipAmount,
    Comments,
}

impl DraftField {
    /// Field name as serialized.
    pub fn as_str(self) -> &'static str {
        match self {
            DraftField::Date => "date",
            DraftField::Time => "time",
            DraftField::OriginAddress => "origin_address",
            DraftField::DestinationAddress => "destination_address",
            DraftField::TotalReceived => "total_received",
            DraftField::PaymentMethod => "payment_method",
            DraftField::RequestSource => "request_source",
            DraftField::TripReason => "trip_reason",
            DraftField::TimeOfDay => "time_of_day",
            DraftField::IsRecurring => "is_recurring",
            DraftField::TipReceived => "tip_received",
            DraftField::TipAmount => "tip_amount",
            DraftField::Comments => "comments",
        }
    }
}

impl RideDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites every field that is set in `patch`; unset fields are kept.
    pub fn merge(&mut self, patch: RideDraft) {
        fn take<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        take(&mut self.date, patch.date);
        take(&mut self.time, patch.time);
        take(&mut self.origin_address, patch.origin_address);
        take(&mut self.destination_address, patch.destination_address);
        take(&mut self.total_received, patch.total_received);
        take(&mut self.payment_method, patch.payment_method);
        take(&mut self.request_source, patch.request_source);
        take(&mut self.trip_reason, patch.trip_reason);
        take(&mut self.time_of_day, patch.time_of_day);
        take(&mut self.is_recurring, patch.is_recurring);
        take(&mut self.tip_received, patch.tip_received);
        take(&mut self.tip_amount, patch.tip_amount);
        take(&mut self.comments, patch.comments);
    }

    /// Unsets `fields`. [`Self::merge`] cannot do this since an unset patch
    /// field means "keep".
    pub fn clear_fields(&mut self, fields: &[DraftField]) {
        for field in fields {
            match field {
                DraftField::Date => self.date = None,
                DraftField::Time => self.time = None,
                DraftField::OriginAddress => self.origin_address = None,
                DraftField::DestinationAddress => self.destination_address = None,
                DraftField::TotalReceived => self.total_received = None,
                DraftField::PaymentMethod => self.payment_method = None,
                DraftField::RequestSource => self.request_source = None,
                DraftField::TripReason => self.trip_reason = None,
                DraftField::TimeOfDay => self.time_of_day = None,
                DraftField::IsRecurring => self.is_recurring = None,
                DraftField::TipReceived => self.tip_received = None,
                DraftField::TipAmount => self.tip_amount = None,
                DraftField::Comments => self.comments = None,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &RideDraft::default()
    }

    /// Labelled lines describing the draft, in step order, for the confirmation screen.
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let mut lines = Vec::new();
        let date = self.date.as_deref().map(|raw| {
            chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(format_date_es)
                .unwrap_or_else(|_| raw.to_string())
        });
        push(&mut lines, "Fecha", date);
        push(&mut lines, "Hora", self.time.clone());
        push(&mut lines, "Origen", self.origin_address.clone());
        push(&mut lines, "Destino", self.destination_address.clone());
        push(&mut lines, "Valor recibido", self.total_received.map(format_cop));
        push(&mut lines, "Solicitud", label_of(self.request_source));
        push(&mut lines, "Motivo", label_of(self.trip_reason));
        push(&mut lines, "Momento del día", label_of(self.time_of_day));
        push(&mut lines, "Recurrente", self.is_recurring.map(yes_no));
        push(&mut lines, "Medio de pago", label_of(self.payment_method));
        match (self.tip_received, self.tip_amount) {
            (Some(true), Some(amount)) => lines.push(("Propina", format_cop(amount))),
            (Some(flag), _) => lines.push(("Propina", yes_no(flag))),
            (None, _) => {}
        }
        push(
            &mut lines,
            "Comentarios",
            self.comments.clone().filter(|text| !text.trim().is_empty()),
        );
        lines
    }
}

fn push(lines: &mut Vec<(&'static str, String)>, label: &'static str, value: Option<String>) {
    if let Some(value) = value {
        lines.push((label, value));
    }
}

fn label_of<T: Displayable>(value: Option<T>) -> Option<String> {
    value.map(|choice| choice.display_label())
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "Sí" } else { "No" };
    text.to_string()
}

/// A ride that passed the whole-record check and can be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRideInput {
    pub date: String,
    pub time: String,
    pub origin_address: String,
    pub destination_address: String,
    pub total_received: f64,
    pub payment_method: PaymentMethod,
    pub request_source: RequestSource,
    pub trip_reason: TripReason,
    pub time_of_day: TimeOfDay,
    pub is_recurring: bool,
    pub tip_received: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl ExternalRideInput {
    /// Amount received including the tip, if one was given.
    pub fn gross_amount(&self) -> f64 {
        let tip = if self.tip_received {
            self.tip_amount.unwrap_or(0.0)
        } else {
            0.0
        };
        self.total_received + tip
    }
}

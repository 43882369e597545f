//! Enumerations describing how an external ride was requested and paid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::common::{parse_choice, Choice};
use crate::errors::WizardError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Nequi,
    Daviplata,
    Bancolombia,
    Other,
}

impl Choice for PaymentMethod {
    const ALL: &'static [Self] = &[
        PaymentMethod::Cash,
        PaymentMethod::Nequi,
        PaymentMethod::Daviplata,
        PaymentMethod::Bancolombia,
        PaymentMethod::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Nequi => "nequi",
            PaymentMethod::Daviplata => "daviplata",
            PaymentMethod::Bancolombia => "bancolombia",
            PaymentMethod::Other => "other",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Efectivo",
            PaymentMethod::Nequi => "Nequi",
            PaymentMethod::Daviplata => "Daviplata",
            PaymentMethod::Bancolombia => "Bancolombia",
            PaymentMethod::Other => "Otro",
        }
    }
}

/// Channel through which the passenger asked for the ride.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RequestSource {
    Whatsapp,
    Phone,
    Referral,
    Other,
}

impl Choice for RequestSource {
    const ALL: &'static [Self] = &[
        RequestSource::Whatsapp,
        RequestSource::Phone,
        RequestSource::Referral,
        RequestSource::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            RequestSource::Whatsapp => "whatsapp",
            RequestSource::Phone => "phone",
            RequestSource::Referral => "referral",
            RequestSource::Other => "other",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RequestSource::Whatsapp => "WhatsApp",
            RequestSource::Phone => "Llamada",
            RequestSource::Referral => "Referido",
            RequestSource::Other => "Otro",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TripReason {
    Personal,
    Work,
    Emergency,
    Other,
}

impl Choice for TripReason {
    const ALL: &'static [Self] = &[
        TripReason::Personal,
        TripReason::Work,
        TripReason::Emergency,
        TripReason::Other,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            TripReason::Personal => "personal",
            TripReason::Work => "work",
            TripReason::Emergency => "emergency",
            TripReason::Other => "other",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TripReason::Personal => "Personal",
            TripReason::Work => "Trabajo",
            TripReason::Emergency => "Emergencia",
            TripReason::Other => "Otro",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Buckets a 24h clock hour: 05–11 morning, 12–17 afternoon, 18–20 evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

impl Choice for TimeOfDay {
    const ALL: &'static [Self] = &[
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Mañana",
            TimeOfDay::Afternoon => "Tarde",
            TimeOfDay::Evening => "Noche temprana",
            TimeOfDay::Night => "Noche",
        }
    }
}

macro_rules! impl_choice_traits {
    ($($ty:ty => $what:literal),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }

            impl FromStr for $ty {
                type Err = WizardError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    parse_choice(s).ok_or_else(|| {
                        WizardError::InvalidInput(format!("unknown {}: `{}`", $what, s.trim()))
                    })
                }
            }
        )*
    };
}

impl_choice_traits! {
    PaymentMethod => "payment method",
    RequestSource => "request source",
    TripReason => "trip reason",
    TimeOfDay => "time of day",
}

//! Many receipts at once: extraction with a summary, then storage of the
//! rides that can be registered.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::RideDraft;
use crate::errors::{Result, WizardError};
use crate::import::{check_financial_consistency, load_receipt, ExtractedRide};
use crate::storage::{JsonRideStore, RIDE_SOURCE_RECEIPT_IMPORT};
use crate::wizard::{RideSchema, StepValidator};

/// A receipt that yielded a ride.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedReceipt {
    pub path: PathBuf,
    pub ride: ExtractedRide,
}

/// A receipt that could not be read or held nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExtractionSummary {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    /// Mean `extraction_confidence` of the successful receipts, two decimals.
    pub average_confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionBatch {
    pub rides: Vec<LoadedReceipt>,
    pub errors: Vec<ReceiptFailure>,
    pub summary: ExtractionSummary,
}

impl ExtractionBatch {
    pub fn is_success(&self) -> bool {
        self.summary.successful > 0
    }
}

/// Loads and parses every receipt in `paths`. Failures are collected per
/// file; one bad receipt never stops the batch.
pub fn load_receipts<P: AsRef<Path>>(paths: &[P]) -> ExtractionBatch {
    let mut rides = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match load_receipt(path).and_then(|ride| ensure_usable(path, ride)) {
            Ok(ride) => rides.push(LoadedReceipt {
                path: path.to_path_buf(),
                ride,
            }),
            Err(err) => {
                warn!(path = %path.display(), %err, "receipt skipped");
                errors.push(ReceiptFailure {
                    path: path.to_path_buf(),
                    error: err.to_string(),
                });
            }
        }
    }

    let successful = rides.len();
    let average_confidence = if successful == 0 {
        0.0
    } else {
        let total: f64 = rides.iter().map(|loaded| loaded.ride.extraction_confidence).sum();
        (total / successful as f64 * 100.0).round() / 100.0
    };
    let summary = ExtractionSummary {
        total_files: paths.len(),
        successful,
        failed: errors.len(),
        average_confidence,
    };
    info!(
        total = summary.total_files,
        successful = summary.successful,
        failed = summary.failed,
        "receipt batch extracted"
    );
    ExtractionBatch {
        rides,
        errors,
        summary,
    }
}

/// A receipt needs money, an identity (date or passenger) or a cancellation
/// to count as extracted.
fn ensure_usable(path: &Path, ride: ExtractedRide) -> Result<ExtractedRide> {
    let has_money = ride.net_income > 0.0 || ride.fare > 0.0 || ride.total_received > 0.0;
    let has_identity = ride.date.is_some() || ride.passenger_name.is_some();
    if has_money || has_identity || ride.is_cancelled() {
        Ok(ride)
    } else {
        Err(WizardError::Import(format!(
            "no ride data found in {}",
            path.display()
        )))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedRide {
    /// Position of the ride in the imported slice.
    pub index: usize,
    pub record_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRide {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: Vec<ImportedRide>,
    pub skipped: Vec<SkippedRide>,
}

impl ImportReport {
    pub fn is_success(&self) -> bool {
        !self.imported.is_empty()
    }
}

/// Stores every ride that can be registered for `driver_id`.
///
/// Receipts never carry the origin, the request channel or the trip reason,
/// so `defaults` supplies them; whatever the receipt holds wins. Cancelled
/// rides, rides whose amounts do not add up and drafts that still fail the
/// ride rules are skipped with a reason.
pub fn import_rides(
    store: &JsonRideStore,
    driver_id: &str,
    vehicle_id: Option<&str>,
    rides: &[ExtractedRide],
    defaults: &RideDraft,
) -> Result<ImportReport> {
    if driver_id.trim().is_empty() {
        return Err(WizardError::InvalidInput("driver id is empty".into()));
    }
    let mut report = ImportReport::default();
    for (index, ride) in rides.iter().enumerate() {
        match import_one(store, driver_id, vehicle_id, ride, defaults) {
            Ok(record_id) => report.imported.push(ImportedRide { index, record_id }),
            Err(reason) => {
                warn!(index, %reason, "ride not imported");
                report.skipped.push(SkippedRide { index, reason });
            }
        }
    }
    info!(
        driver_id,
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        "receipt rides imported"
    );
    Ok(report)
}

fn import_one(
    store: &JsonRideStore,
    driver_id: &str,
    vehicle_id: Option<&str>,
    ride: &ExtractedRide,
    defaults: &RideDraft,
) -> std::result::Result<String, String> {
    if ride.is_cancelled() {
        return Err("Carrera cancelada, no genera ingresos".into());
    }
    let problems = check_financial_consistency(ride);
    if !problems.is_empty() {
        return Err(format!("Valores inconsistentes: {}", problems.join("; ")));
    }
    let mut draft = defaults.clone();
    draft.merge(ride.to_draft().map_err(|err| err.to_string())?);
    let record = RideSchema
        .validate_record(&draft)
        .map_err(|err| format!("Datos incompletos: {}", err.messages().join(", ")))?;
    store
        .insert(driver_id, &record, vehicle_id, RIDE_SOURCE_RECEIPT_IMPORT)
        .map(|stored| stored.id)
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PaymentMethod, RequestSource, TripReason};
    use crate::import::RideStatus;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn defaults() -> RideDraft {
        RideDraft {
            origin_address: Some("Parque Olaya".into()),
            request_source: Some(RequestSource::Other),
            trip_reason: Some(TripReason::Other),
            is_recurring: Some(false),
            tip_received: Some(false),
            payment_method: Some(PaymentMethod::Cash),
            ..RideDraft::default()
        }
    }

    fn completed_ride() -> ExtractedRide {
        ExtractedRide {
            date: NaiveDate::from_ymd_opt(2025, 12, 2),
            time: Some("19:52".into()),
            destination_address: Some("Cl. 19 #12-50, Pereira".into()),
            payment_method: PaymentMethod::Nequi,
            fare: 18_000.0,
            total_received: 18_000.0,
            service_fee: 1_710.0,
            service_fee_tax: 324.9,
            total_paid: 2_034.9,
            net_income: 15_965.1,
            ..ExtractedRide::default()
        }
    }

    #[test]
    fn batch_summarizes_successes_and_failures() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.txt");
        fs::write(&good, "Tarifa 12.500,00 COP\nPago en efectivo\n").unwrap();
        let noise = temp.path().join("noise.txt");
        fs::write(&noise, "hola\n").unwrap();
        let missing = temp.path().join("missing.txt");

        let batch = load_receipts(&[good.clone(), noise.clone(), missing.clone()]);
        assert!(batch.is_success());
        assert_eq!(batch.summary.total_files, 3);
        assert_eq!(batch.summary.successful, 1);
        assert_eq!(batch.summary.failed, 2);
        assert_eq!(batch.rides[0].path, good);
        let failed: Vec<&PathBuf> = batch.errors.iter().map(|failure| &failure.path).collect();
        assert_eq!(failed, vec![&noise, &missing]);

        let confidence = batch.rides[0].ride.extraction_confidence;
        assert!((batch.summary.average_confidence - confidence).abs() <= 0.005);
    }

    #[test]
    fn empty_batch_is_not_a_success() {
        let batch = load_receipts::<PathBuf>(&[]);
        assert!(!batch.is_success());
        assert_eq!(batch.summary.average_confidence, 0.0);
    }

    #[test]
    fn import_stores_completed_rides_and_skips_cancelled_ones() {
        let temp = TempDir::new().unwrap();
        let store = JsonRideStore::new(Some(temp.path().to_path_buf())).unwrap();
        let cancelled = ExtractedRide {
            status: RideStatus::CancelledByPassenger,
            ..ExtractedRide::default()
        };
        let rides = [completed_ride(), cancelled];

        let report = import_rides(&store, "driver-1", Some("veh-3"), &rides, &defaults()).unwrap();
        assert!(report.is_success());
        assert_eq!(report.imported.len(), 1);
        assert_eq!(report.imported[0].index, 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert!(report.skipped[0].reason.contains("cancelada"));

        let stored = store.list("driver-1").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, report.imported[0].record_id);
        assert_eq!(stored[0].source, RIDE_SOURCE_RECEIPT_IMPORT);
        assert_eq!(stored[0].vehicle_id.as_deref(), Some("veh-3"));
        assert_eq!(stored[0].ride.origin_address, "Parque Olaya");
        assert_eq!(stored[0].ride.payment_method, PaymentMethod::Nequi);
        assert_eq!(stored[0].ride.total_received, 18_000.0);
    }

    #[test]
    fn inconsistent_or_incomplete_rides_are_skipped_with_reasons() {
        let temp = TempDir::new().unwrap();
        let store = JsonRideStore::new(Some(temp.path().to_path_buf())).unwrap();
        let inconsistent = ExtractedRide {
            net_income: 1_000.0,
            ..completed_ride()
        };

        let report = import_rides(
            &store,
            "driver-1",
            None,
            &[inconsistent, completed_ride()],
            &RideDraft::default(),
        )
        .unwrap();
        assert!(!report.is_success());
        assert!(report.skipped[0].reason.starts_with("Valores inconsistentes"));
        assert!(report.skipped[1].reason.starts_with("Datos incompletos"));
        assert!(store.list("driver-1").unwrap().is_empty());
    }

    #[test]
    fn import_needs_a_driver() {
        let temp = TempDir::new().unwrap();
        let store = JsonRideStore::new(Some(temp.path().to_path_buf())).unwrap();
        let err = import_rides(&store, " ", None, &[completed_ride()], &defaults())
            .expect_err("blank driver");
        assert!(matches!(err, WizardError::InvalidInput(_)));
    }
}

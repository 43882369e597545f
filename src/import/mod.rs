//! Prefilling the wizard from text recognized on a ride-app receipt, and
//! importing batches of receipts straight into the store.

mod batch;
mod extracted;
mod text_parser;

use std::fs;
use std::path::Path;

use tracing::{info, warn};

pub use extracted::{
    check_financial_consistency, DistanceUnit, DurationUnit, ExtractedRide, FieldConfidences,
    RideDistance, RideDuration, RideStatus, AMOUNT_TOLERANCE, DEFAULT_FEE_PERCENTAGE,
    SERVICE_FEE_TAX_RATE,
};
pub use batch::{
    import_rides, load_receipts, ExtractionBatch, ExtractionSummary, ImportReport, ImportedRide,
    LoadedReceipt, ReceiptFailure, SkippedRide,
};
pub use text_parser::parse_receipt;

use crate::errors::{Result, WizardError};

/// Reads a receipt text file and parses it. Financial mismatches are logged,
/// not fatal.
pub fn load_receipt(path: &Path) -> Result<ExtractedRide> {
    let text = fs::read_to_string(path).map_err(|err| {
        WizardError::Import(format!("cannot read receipt {}: {err}", path.display()))
    })?;
    if text.trim().is_empty() {
        return Err(WizardError::Import(format!(
            "receipt {} is empty",
            path.display()
        )));
    }
    let ride = parse_receipt(&text);
    for problem in check_financial_consistency(&ride) {
        warn!(path = %path.display(), %problem, "receipt amounts do not add up");
    }
    info!(
        path = %path.display(),
        confidence = ride.extraction_confidence,
        "receipt imported"
    );
    Ok(ride)
}

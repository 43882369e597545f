//! File-backed ride store: one JSON document per driver.

use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ExternalRideInput;
use crate::errors::{Result, WizardError};
use crate::submit::{generate_record_id, FormSubmitter, SubmitError, SubmitResponse};
use crate::utils::paths::{ensure_dir, file_stem_for, write_atomic, PathResolver};

pub const RIDE_SOURCE_EXTERNAL_WIZARD: &str = "external_wizard";
pub const RIDE_SOURCE_RECEIPT_IMPORT: &str = "receipt_import";

/// A persisted ride plus the bookkeeping the store adds to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRide {
    pub id: String,
    pub driver_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub ride: ExternalRideInput,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DriverRides {
    rides: Vec<StoredRide>,
}

/// Ride documents are small; reads and writes run inline under a sync lock
/// that is never held across an `.await`.
pub struct JsonRideStore {
    rides_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonRideStore {
    /// Opens (and creates) the store under `root`, or under the default
    /// application directory when `root` is `None`.
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = PathResolver::resolve_base(root);
        let rides_dir = PathResolver::rides_dir_in(&base);
        ensure_dir(&rides_dir)?;
        Ok(Self {
            rides_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn rides_dir(&self) -> &Path {
        &self.rides_dir
    }

    pub fn driver_path(&self, driver_id: &str) -> PathBuf {
        self.rides_dir
            .join(format!("{}.json", file_stem_for(driver_id)))
    }

    /// Rides stored for `driver_id`, newest first.
    pub fn list(&self, driver_id: &str) -> Result<Vec<StoredRide>> {
        let driver_id = driver_id.trim();
        let mut rides: Vec<StoredRide> = read_driver_file(&self.driver_path(driver_id))?
            .rides
            .into_iter()
            .filter(|ride| ride.driver_id == driver_id)
            .collect();
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rides)
    }

    /// Appends `record` to the driver's file and returns what was stored.
    pub fn insert(
        &self,
        driver_id: &str,
        record: &ExternalRideInput,
        vehicle_id: Option<&str>,
        source: &str,
    ) -> Result<StoredRide> {
        let driver_id = driver_id.trim();
        if driver_id.is_empty() {
            return Err(WizardError::InvalidInput("driver id is empty".into()));
        }
        let stored = StoredRide {
            id: generate_record_id(),
            driver_id: driver_id.to_string(),
            vehicle_id: vehicle_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            created_at: Utc::now(),
            source: source.to_string(),
            ride: record.clone(),
        };

        let _guard = self.write_lock.lock();
        let path = self.driver_path(driver_id);
        let mut document = read_driver_file(&path)?;
        document.rides.push(stored.clone());
        let json = serde_json::to_string_pretty(&document)?;
        write_atomic(&path, &json)?;
        debug!(path = %path.display(), count = document.rides.len(), source, "ride file updated");
        Ok(stored)
    }
}

#[async_trait]
impl FormSubmitter for JsonRideStore {
    async fn submit(
        &self,
        entity_id: &str,
        record: &ExternalRideInput,
        related_id: Option<&str>,
    ) -> std::result::Result<SubmitResponse, SubmitError> {
        if entity_id.trim().is_empty() {
            return Ok(SubmitResponse::Rejected {
                message: Some("Falta el conductor al que pertenece la carrera.".into()),
            });
        }
        let stored = self
            .insert(entity_id, record, related_id, RIDE_SOURCE_EXTERNAL_WIZARD)
            .map_err(|err| SubmitError::Storage(err.to_string()))?;
        Ok(SubmitResponse::Accepted {
            record_id: stored.id,
        })
    }
}

fn read_driver_file(path: &Path) -> Result<DriverRides> {
    if !path.exists() {
        return Ok(DriverRides::default());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

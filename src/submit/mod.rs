//! Contract for handing a validated ride to whatever persists it.

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::ExternalRideInput;

/// Explicit answer from a submitter that was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResponse {
    Accepted { record_id: String },
    Rejected { message: Option<String> },
}

/// Failures where the submitter could not give an answer at all.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("unexpected submitter failure: {0}")]
    Other(String),
}

impl From<std::io::Error> for SubmitError {
    fn from(err: std::io::Error) -> Self {
        SubmitError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SubmitError {
    fn from(err: serde_json::Error) -> Self {
        SubmitError::Storage(err.to_string())
    }
}

/// Persists an assembled ride for a driver (`entity_id`), optionally tied to
/// a vehicle (`related_id`). Calls are not idempotent.
#[async_trait]
pub trait FormSubmitter: Send + Sync {
    async fn submit(
        &self,
        entity_id: &str,
        record: &ExternalRideInput,
        related_id: Option<&str>,
    ) -> Result<SubmitResponse, SubmitError>;
}

/// Builds a client-side record id: `ext_<unix millis>_<8 hex chars>`.
///
/// Nothing deduplicates these, so resubmitting after an ambiguous failure can
/// store the same ride twice.
pub fn generate_record_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("ext_{}_{}", Utc::now().timestamp_millis(), &suffix[..8])
}

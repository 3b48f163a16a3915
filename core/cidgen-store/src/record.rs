//! Activation request record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of an activation request record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a new random record ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a record ID from a string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationStatus {
    /// Created, waiting for the activation outcome.
    Pending,
    /// A confirmation id was issued.
    Success,
    /// Activation failed; see `error_message`.
    Failed,
}

/// A validated activation request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActivationRequest {
    pub installation_id: String,
    pub product_version: String,
}

/// A stored activation request and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRecord {
    pub id: RecordId,
    pub installation_id: String,
    pub product_version: String,
    pub confirmation_id: Option<String>,
    pub status: ActivationStatus,
    pub error_message: Option<String>,
    /// Wall-clock duration of the activation, e.g. `"1.234s"`.
    pub processing_time: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivationRecord {
    /// Creates a pending record for `request`.
    #[must_use]
    pub fn pending(request: NewActivationRequest) -> Self {
        Self {
            id: RecordId::new(),
            installation_id: request.installation_id,
            product_version: request.product_version,
            confirmation_id: None,
            status: ActivationStatus::Pending,
            error_message: None,
            processing_time: None,
            created_at: Utc::now(),
        }
    }

    /// Applies the fields present in `patch`.
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(confirmation_id) = patch.confirmation_id {
            self.confirmation_id = Some(confirmation_id);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(error_message) = patch.error_message {
            self.error_message = Some(error_message);
        }
        if let Some(processing_time) = patch.processing_time {
            self.processing_time = Some(processing_time);
        }
    }
}

/// Partial update for an [`ActivationRecord`]. `None` fields are left as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub confirmation_id: Option<String>,
    pub status: Option<ActivationStatus>,
    pub error_message: Option<String>,
    pub processing_time: Option<String>,
}

impl RecordPatch {
    /// Patch recording a successful activation.
    #[must_use]
    pub fn success(confirmation_id: impl Into<String>, processing_time: impl Into<String>) -> Self {
        Self {
            confirmation_id: Some(confirmation_id.into()),
            status: Some(ActivationStatus::Success),
            processing_time: Some(processing_time.into()),
            ..Default::default()
        }
    }

    /// Patch recording a failed activation.
    #[must_use]
    pub fn failure(error_message: impl Into<String>, processing_time: impl Into<String>) -> Self {
        Self {
            status: Some(ActivationStatus::Failed),
            error_message: Some(error_message.into()),
            processing_time: Some(processing_time.into()),
            ..Default::default()
        }
    }
}

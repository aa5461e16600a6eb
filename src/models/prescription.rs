use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonMap;

/// Persisted prescription. Written once by the generation pipeline and
/// never updated afterwards; `created_at` is assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Row content handed to the store; id and timestamp are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrescription {
    pub patient_id: Uuid,
    pub clinician_id: Uuid,
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: String,
}

/// Body of `POST /api/prescriptions/generate`.
///
/// Identifiers stay as raw strings here: parsing them is a pipeline step
/// with its own error category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionRequest {
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub clinician_id: String,
    pub visit_notes: Option<String>,
    pub medical_history: Option<JsonMap>,
    pub insurance_details: Option<JsonMap>,
}

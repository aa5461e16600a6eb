use crate::config::ApiKey;
use crate::db::{insert_prescription, Database, DatabaseError};
use crate::models::{NewPrescription, Prescription};

use super::LlmError;

/// Value stored for any field the parser could not recover.
pub const PARSE_ERROR: &str = "Parse Error";

/// Medication, dosage and frequency recovered from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    pub medication: String,
    pub dosage: String,
    pub frequency: String,
}

impl ParsedFields {
    pub fn has_parse_errors(&self) -> bool {
        [&self.medication, &self.dosage, &self.frequency]
            .iter()
            .any(|v| v.as_str() == PARSE_ERROR)
    }
}

/// Remote text completion. One request per call, no retries.
pub trait LlmGateway: Send + Sync {
    /// Send `prompt` and return the raw response body.
    fn complete(&self, prompt: &str, api_key: &ApiKey) -> Result<String, LlmError>;
}

/// Turns a completion into prescription fields.
///
/// Kept behind a trait so the extraction rules can be swapped or versioned
/// without touching the pipeline.
pub trait ResponseParser: Send + Sync {
    /// Pull the generated text out of the provider envelope. Never fails:
    /// problems come back as a readable sentinel string.
    fn extract_text(&self, raw: &str) -> String;

    /// Never fails: unrecoverable fields hold [`PARSE_ERROR`].
    fn parse_fields(&self, text: &str) -> ParsedFields;
}

/// Where finished prescriptions are written.
pub trait PrescriptionStore: Send + Sync {
    /// Persist atomically: either the row exists afterwards or nothing changed.
    fn save_prescription(&self, new: &NewPrescription) -> Result<Prescription, DatabaseError>;
}

impl PrescriptionStore for Database {
    fn save_prescription(&self, new: &NewPrescription) -> Result<Prescription, DatabaseError> {
        self.with_transaction(|tx| insert_prescription(tx, new))
    }
}

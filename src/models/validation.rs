use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Allergy,
    Duplicate,
    /// Reserved for drug-interaction checks; never emitted yet.
    Interaction,
    ValidationError,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allergy => "ALLERGY",
            Self::Duplicate => "DUPLICATE",
            Self::Interaction => "INTERACTION",
            Self::ValidationError => "VALIDATION_ERROR",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedPrescription {
    pub medication_name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
}

impl ProposedPrescription {
    pub fn named(name: &str) -> Self {
        Self {
            medication_name: Some(name.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPrescription {
    pub medication_name: Option<String>,
}

impl CurrentPrescription {
    pub fn named(name: &str) -> Self {
        Self {
            medication_name: Some(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub medication: String,
    pub details: String,
}

/// Body of `POST /api/prescriptions/validate`. The caller supplies the
/// patient's allergies and current medications; nothing is looked up.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionValidationRequest {
    /// Only used to label log lines.
    pub patient_id: Option<String>,
    /// List entries may be `null`; the validator reports those instead of
    /// the extractor rejecting the whole body.
    pub proposed_prescriptions: Option<Vec<Option<ProposedPrescription>>>,
    pub patient_allergies: Option<Vec<Option<String>>>,
    pub current_prescriptions: Option<Vec<Option<CurrentPrescription>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub validation_issues: Vec<ValidationIssue>,
}

//! Prescription safety checks.
//!
//! Compares a list of proposed medications against the patient's reported
//! allergies and current prescriptions. Matching is a case-insensitive exact
//! comparison of names: no fuzzy matching, no ingredient expansion.
//!
//! The check never fails outward. A malformed request still produces a
//! result, with a single `VALIDATION_ERROR` issue appended after whatever
//! was found before the fault.

use thiserror::Error;

use crate::models::{
    CurrentPrescription, IssueType, PrescriptionValidationRequest, ProposedPrescription,
    ValidationIssue,
};

pub const INTERNAL_ERROR_DETAILS: &str = "An internal error occurred during validation logic.";
const NOT_APPLICABLE: &str = "N/A";

/// Faults that abort the remaining checks.
#[derive(Debug, Error, PartialEq, Eq)]
enum ValidationFault {
    #[error("proposed prescription list is absent")]
    MissingProposedList,
    #[error("proposed prescription {index} is null")]
    NullProposed { index: usize },
    #[error("allergy entry {index} is null")]
    NullAllergy { index: usize },
    #[error("current prescription {index} is null")]
    NullCurrent { index: usize },
}

/// Validate a request as received over the wire.
pub fn validate_request(request: &PrescriptionValidationRequest) -> Vec<ValidationIssue> {
    let empty_current = Vec::new();
    let empty_allergies = Vec::new();
    let current = request.current_prescriptions.as_ref().unwrap_or(&empty_current);
    let allergies = request.patient_allergies.as_ref().unwrap_or(&empty_allergies);

    let mut issues = Vec::new();
    let outcome = match request.proposed_prescriptions.as_ref() {
        Some(proposed) => run_checks(proposed, allergies, current, &mut issues),
        None => Err(ValidationFault::MissingProposedList),
    };

    if let Err(fault) = outcome {
        tracing::error!(
            patient_id = request.patient_id.as_deref().unwrap_or("unknown"),
            error = %fault,
            "Validation aborted"
        );
        issues.push(ValidationIssue {
            issue_type: IssueType::ValidationError,
            medication: NOT_APPLICABLE.to_string(),
            details: INTERNAL_ERROR_DETAILS.to_string(),
        });
    }

    tracing::info!(
        patient_id = request.patient_id.as_deref().unwrap_or("unknown"),
        issues = issues.len(),
        "Validation complete"
    );
    issues
}

/// Validate already well-formed inputs.
pub fn validate(
    proposed: &[ProposedPrescription],
    allergies: &[String],
    current: &[CurrentPrescription],
) -> Vec<ValidationIssue> {
    let proposed: Vec<_> = proposed.iter().cloned().map(Some).collect();
    let allergies: Vec<_> = allergies.iter().cloned().map(Some).collect();
    let current: Vec<_> = current.iter().cloned().map(Some).collect();
    let mut issues = Vec::new();
    // No null entries, so the only fault sources are gone.
    let _ = run_checks(&proposed, &allergies, &current, &mut issues);
    issues
}

fn run_checks(
    proposed: &[Option<ProposedPrescription>],
    allergies: &[Option<String>],
    current: &[Option<CurrentPrescription>],
    issues: &mut Vec<ValidationIssue>,
) -> Result<(), ValidationFault> {
    for (index, entry) in proposed.iter().enumerate() {
        let entry = entry
            .as_ref()
            .ok_or(ValidationFault::NullProposed { index })?;

        // A nameless entry matches nothing, but the lists are still scanned
        // so null entries in them are reported.
        let name = entry.medication_name.as_deref();
        let needle = name.map(str::to_lowercase);

        if matches_allergy(needle.as_deref(), allergies)? {
            if let Some(name) = name {
                issues.push(ValidationIssue {
                    issue_type: IssueType::Allergy,
                    medication: name.to_string(),
                    details: format!("Patient reported allergy to {name}"),
                });
            }
        }

        if matches_current(needle.as_deref(), current)? {
            if let Some(name) = name {
                issues.push(ValidationIssue {
                    issue_type: IssueType::Duplicate,
                    medication: name.to_string(),
                    details: format!("Patient is already prescribed {name}"),
                });
            }
        }

        // TODO: emit IssueType::Interaction once a drug-interaction table is available.
    }
    Ok(())
}

/// Stops at the first match; a null entry before any match is a fault.
fn matches_allergy(
    needle: Option<&str>,
    allergies: &[Option<String>],
) -> Result<bool, ValidationFault> {
    for (index, allergy) in allergies.iter().enumerate() {
        let allergy = allergy
            .as_deref()
            .ok_or(ValidationFault::NullAllergy { index })?;
        if needle.is_some_and(|n| allergy.to_lowercase() == n) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Same scan over current prescriptions. An entry without a name is skipped;
/// a null entry before any match is a fault.
fn matches_current(
    needle: Option<&str>,
    current: &[Option<CurrentPrescription>],
) -> Result<bool, ValidationFault> {
    for (index, entry) in current.iter().enumerate() {
        let entry = entry
            .as_ref()
            .ok_or(ValidationFault::NullCurrent { index })?;
        let matched = entry
            .medication_name
            .as_deref()
            .zip(needle)
            .is_some_and(|(name, n)| name.to_lowercase() == n);
        if matched {
            return Ok(true);
        }
    }
    Ok(false)
}

use crate::models::{JsonMap, PrescriptionRequest};

pub const PROMPT_PREAMBLE: &str =
    "Given the following patient information and visit notes, suggest a prescription.";

pub const PROMPT_INSTRUCTION: &str = "Suggest Medication, Dosage, and Frequency. Format the response clearly, for example: Medication: [Name], Dosage: [Amount], Frequency: [How often]. Respond ONLY with the Medication, Dosage, and Frequency details in the specified format.";

const NOT_PROVIDED: &str = "Not Provided";

/// Build the drafting prompt for one request.
///
/// Deterministic: map entries are rendered in key order so the same request
/// always yields the same prompt. Absent visit notes render as an empty
/// section rather than being dropped.
pub fn build_prescription_prompt(request: &PrescriptionRequest) -> String {
    let mut prompt = String::from(PROMPT_PREAMBLE);
    prompt.push_str("\n\nPatient Medical History/Allergens:\n");
    prompt.push_str(&render_map(request.medical_history.as_ref()));
    prompt.push_str("\n\nPatient Insurance Details (Consider for formulary/cost if possible):\n");
    prompt.push_str(&render_map(request.insurance_details.as_ref()));
    prompt.push_str("\n\nVisit Notes (Diagnosis and Treatment Plan):\n");
    prompt.push_str(request.visit_notes.as_deref().unwrap_or_default());
    prompt.push_str("\n\n");
    prompt.push_str(PROMPT_INSTRUCTION);
    prompt
}

/// `key: value` per line, or "Not Provided" for an absent or empty map.
/// String values are written bare; anything else as compact JSON.
fn render_map(map: Option<&JsonMap>) -> String {
    let Some(map) = map.filter(|m| !m.is_empty()) else {
        return NOT_PROVIDED.to_string();
    };

    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(key);
        out.push_str(": ");
        match value {
            serde_json::Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> JsonMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn empty_request_uses_placeholders() {
        let prompt = build_prescription_prompt(&PrescriptionRequest::default());
        assert!(prompt.starts_with(PROMPT_PREAMBLE));
        assert!(prompt.contains("Patient Medical History/Allergens:\nNot Provided"));
        assert!(prompt.contains(
            "Patient Insurance Details (Consider for formulary/cost if possible):\nNot Provided"
        ));
        assert!(prompt.ends_with(PROMPT_INSTRUCTION));
    }

    #[test]
    fn empty_map_is_not_provided() {
        let request = PrescriptionRequest {
            medical_history: Some(JsonMap::new()),
            ..Default::default()
        };
        let prompt = build_prescription_prompt(&request);
        assert!(prompt.contains("Allergens:\nNot Provided"));
    }

    #[test]
    fn map_entries_sorted_one_per_line() {
        let request = PrescriptionRequest {
            medical_history: Some(map(json!({
                "conditions": "hypertension",
                "allergies": ["penicillin"],
                "age": 54
            }))),
            ..Default::default()
        };
        let prompt = build_prescription_prompt(&request);
        assert!(prompt.contains(
            "Allergens:\nage: 54\nallergies: [\"penicillin\"]\nconditions: hypertension\n"
        ));
    }

    #[test]
    fn visit_notes_verbatim() {
        let notes = "Dx: strep throat.\nPlan: antibiotics, 10 days.";
        let request = PrescriptionRequest {
            visit_notes: Some(notes.into()),
            ..Default::default()
        };
        let prompt = build_prescription_prompt(&request);
        assert!(prompt.contains(&format!(
            "Visit Notes (Diagnosis and Treatment Plan):\n{notes}\n\n{PROMPT_INSTRUCTION}"
        )));
    }

    #[test]
    fn prompt_is_deterministic() {
        let request = PrescriptionRequest {
            insurance_details: Some(map(json!({"plan": "gold", "provider": "Acme"}))),
            visit_notes: Some("Cough".into()),
            ..Default::default()
        };
        assert_eq!(
            build_prescription_prompt(&request),
            build_prescription_prompt(&request)
        );
    }
}

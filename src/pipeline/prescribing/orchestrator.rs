use std::sync::Arc;

use uuid::Uuid;

use super::prompt::build_prescription_prompt;
use super::types::{LlmGateway, PrescriptionStore, ResponseParser};
use super::PipelineError;
use crate::config::ApiKey;
use crate::models::{NewPrescription, Prescription, PrescriptionRequest};

pub const NOTES_PREFIX: &str = "Generated by AI. LLM Raw Text: ";

/// Drafts a prescription with the LLM and stores it:
/// key check → ids → prompt → LLM → parse → persist.
///
/// Nothing is written unless the LLM answered. Parse problems are not
/// failures: the affected fields hold the parse sentinel and the extracted
/// text is kept in `notes`.
pub struct PrescriptionPipeline {
    gateway: Arc<dyn LlmGateway>,
    parser: Arc<dyn ResponseParser>,
    store: Arc<dyn PrescriptionStore>,
    api_key: Option<ApiKey>,
}

impl PrescriptionPipeline {
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        parser: Arc<dyn ResponseParser>,
        store: Arc<dyn PrescriptionStore>,
        api_key: Option<ApiKey>,
    ) -> Self {
        Self {
            gateway,
            parser,
            store,
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send an arbitrary prompt and return the generated text.
    pub fn complete(&self, prompt: &str) -> Result<String, PipelineError> {
        let api_key = self.require_key()?;
        let raw = self.gateway.complete(prompt, api_key)?;
        Ok(self.parser.extract_text(&raw))
    }

    pub fn generate_and_save(
        &self,
        request: &PrescriptionRequest,
    ) -> Result<Prescription, PipelineError> {
        let api_key = self.require_key()?;

        // Reject bad ids before spending an LLM call on them.
        let patient_id = parse_id("patientId", &request.patient_id)?;
        let clinician_id = parse_id("clinicianId", &request.clinician_id)?;

        let prompt = build_prescription_prompt(request);
        tracing::debug!(patient_id = %patient_id, prompt_chars = prompt.len(), "Prompt built");

        let raw = self.gateway.complete(&prompt, api_key).map_err(|e| {
            tracing::error!(patient_id = %patient_id, error = %e, "LLM call failed");
            PipelineError::Upstream(e)
        })?;

        let text = self.parser.extract_text(&raw);
        let fields = self.parser.parse_fields(&text);
        if fields.has_parse_errors() {
            tracing::warn!(
                patient_id = %patient_id,
                medication = %fields.medication,
                dosage = %fields.dosage,
                frequency = %fields.frequency,
                "Could not parse every prescription field from LLM reply"
            );
        }

        let draft = NewPrescription {
            patient_id,
            clinician_id,
            medication: fields.medication,
            dosage: fields.dosage,
            frequency: fields.frequency,
            notes: format!("{NOTES_PREFIX}{text}"),
        };

        let saved = self.store.save_prescription(&draft).map_err(|e| {
            tracing::error!(patient_id = %patient_id, error = %e, "Failed to save prescription");
            PipelineError::Storage(e)
        })?;

        tracing::info!(
            prescription_id = %saved.id,
            patient_id = %patient_id,
            medication = %saved.medication,
            "Prescription saved"
        );
        Ok(saved)
    }

    fn require_key(&self) -> Result<&ApiKey, PipelineError> {
        self.api_key.as_ref().ok_or_else(|| {
            tracing::error!("LLM API key is not configured");
            PipelineError::Configuration("LLM API key is not configured".into())
        })
    }
}

fn parse_id(field: &str, raw: &str) -> Result<Uuid, PipelineError> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        tracing::warn!(field, "Malformed identifier in prescription request");
        PipelineError::Input(format!("{field} is not a valid UUID"))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::db::{create_clinician, create_patient, get_prescriptions_for_patient, Database, DatabaseError};
    use crate::models::{NewClinician, NewPatient};
    use crate::pipeline::prescribing::{LabelledFieldParser, MockLlmGateway, PARSE_ERROR};

    /// Store that counts persist attempts and never touches a database.
    struct CountingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingStore {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl PrescriptionStore for CountingStore {
        fn save_prescription(&self, new: &NewPrescription) -> Result<Prescription, DatabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DatabaseError::ConstraintViolation("forced".into()));
            }
            Ok(Prescription {
                id: Uuid::new_v4(),
                patient_id: new.patient_id,
                clinician_id: new.clinician_id,
                medication: new.medication.clone(),
                dosage: new.dosage.clone(),
                frequency: new.frequency.clone(),
                notes: new.notes.clone(),
                created_at: chrono::Utc::now(),
            })
        }
    }

    fn key() -> Option<ApiKey> {
        ApiKey::from_raw(Some("k".into()))
    }

    fn request(patient_id: &str, clinician_id: &str) -> PrescriptionRequest {
        PrescriptionRequest {
            patient_id: patient_id.into(),
            clinician_id: clinician_id.into(),
            visit_notes: Some("Strep throat, start antibiotics".into()),
            ..Default::default()
        }
    }

    fn pipeline(
        gateway: Arc<MockLlmGateway>,
        store: Arc<CountingStore>,
        api_key: Option<ApiKey>,
    ) -> PrescriptionPipeline {
        PrescriptionPipeline::new(gateway, Arc::new(LabelledFieldParser), store, api_key)
    }

    #[test]
    fn saves_parsed_fields_and_raw_text() {
        let reply = "Medication: Amoxicillin, Dosage: 500mg, Frequency: twice daily";
        let gateway = Arc::new(MockLlmGateway::with_text(reply));
        let store = Arc::new(CountingStore::new(false));
        let p = pipeline(gateway.clone(), store.clone(), key());

        let ids = (Uuid::new_v4(), Uuid::new_v4());
        let saved = p
            .generate_and_save(&request(&ids.0.to_string(), &ids.1.to_string()))
            .unwrap();

        assert_eq!(saved.patient_id, ids.0);
        assert_eq!(saved.clinician_id, ids.1);
        assert_eq!(saved.medication, "Amoxicillin");
        assert_eq!(saved.dosage, "500mg");
        assert_eq!(saved.frequency, "twice daily");
        assert_eq!(saved.notes, format!("{NOTES_PREFIX}{reply}"));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert!(gateway.last_prompt().unwrap().contains("Strep throat"));
    }

    #[test]
    fn missing_key_fails_before_any_call() {
        let gateway = Arc::new(MockLlmGateway::with_text("Medication: A"));
        let store = Arc::new(CountingStore::new(false));
        let p = pipeline(gateway.clone(), store.clone(), None);

        let err = p
            .generate_and_save(&request(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Configuration(_)));
        assert_eq!(gateway.call_count(), 0);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn malformed_patient_id_never_persists() {
        for gateway in [
            MockLlmGateway::with_text("Medication: A, Dosage: B, Frequency: C"),
            MockLlmGateway::failing(500, "down"),
        ] {
            let gateway = Arc::new(gateway);
            let store = Arc::new(CountingStore::new(false));
            let p = pipeline(gateway.clone(), store.clone(), key());

            let err = p
                .generate_and_save(&request("not-a-uuid", &Uuid::new_v4().to_string()))
                .unwrap_err();
            assert!(matches!(err, PipelineError::Input(_)));
            assert_eq!(gateway.call_count(), 0);
            assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn malformed_clinician_id_is_input_error() {
        let gateway = Arc::new(MockLlmGateway::with_text("Medication: A"));
        let store = Arc::new(CountingStore::new(false));
        let p = pipeline(gateway, store, key());
        let err = p
            .generate_and_save(&request(&Uuid::new_v4().to_string(), ""))
            .unwrap_err();
        assert!(err.to_string().contains("clinicianId"));
    }

    #[test]
    fn upstream_failure_writes_nothing() {
        let gateway = Arc::new(MockLlmGateway::failing(503, "unavailable"));
        let store = Arc::new(CountingStore::new(false));
        let p = pipeline(gateway.clone(), store.clone(), key());

        let err = p
            .generate_and_save(&request(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Upstream(_)));
        assert_eq!(gateway.call_count(), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unparseable_reply_still_persists_with_sentinels() {
        let gateway = Arc::new(MockLlmGateway::new("not json at all"));
        let store = Arc::new(CountingStore::new(false));
        let p = pipeline(gateway, store.clone(), key());

        let saved = p
            .generate_and_save(&request(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string()))
            .unwrap();
        assert_eq!(saved.medication, PARSE_ERROR);
        assert_eq!(saved.dosage, PARSE_ERROR);
        assert_eq!(saved.frequency, PARSE_ERROR);
        assert_eq!(
            saved.notes,
            "Generated by AI. LLM Raw Text: Error: Failed parsing response structure"
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn store_failure_is_storage_error() {
        let gateway = Arc::new(MockLlmGateway::with_text("Medication: A, Dosage: B, Frequency: C"));
        let store = Arc::new(CountingStore::new(true));
        let p = pipeline(gateway, store, key());
        let err = p
            .generate_and_save(&request(&Uuid::new_v4().to_string(), &Uuid::new_v4().to_string()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Storage(_)));
    }

    #[test]
    fn persists_to_sqlite_and_rolls_back_on_unknown_ids() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let (patient, clinician) = db
            .with_conn(|conn| {
                Ok((
                    create_patient(conn, NewPatient::default())?,
                    create_clinician(conn, NewClinician::default())?,
                ))
            })
            .unwrap();

        let gateway = Arc::new(MockLlmGateway::with_text(
            "Medication: Azithromycin, Dosage: 250mg, Frequency: once daily",
        ));
        let p = PrescriptionPipeline::new(
            gateway,
            Arc::new(LabelledFieldParser),
            db.clone(),
            key(),
        );

        let saved = p
            .generate_and_save(&request(&patient.id.to_string(), &clinician.id.to_string()))
            .unwrap();
        let err = p
            .generate_and_save(&request(&patient.id.to_string(), &Uuid::new_v4().to_string()))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Storage(_)));

        let history = db
            .with_conn(|conn| get_prescriptions_for_patient(conn, &patient.id))
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, saved.id);
        assert_eq!(history[0].medication, "Azithromycin");
    }

    #[test]
    fn completion_returns_extracted_text() {
        let gateway = Arc::new(MockLlmGateway::with_text("Hello there"));
        let p = pipeline(gateway, Arc::new(CountingStore::new(false)), key());
        assert_eq!(p.complete("hi").unwrap(), "Hello there");
    }
}

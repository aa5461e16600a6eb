pub mod extraction; // Base64 image -> text via the configured OCR backend
pub mod prescribing; // Prompt -> LLM -> field parsing -> persisted prescription

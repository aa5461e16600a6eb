pub mod clinician;
pub mod patient;
pub mod prescription;
pub mod validation;
pub mod visit;

pub use clinician::*;
pub use patient::*;
pub use prescription::*;
pub use validation::*;
pub use visit::*;

/// Free-form JSON object as stored in `medical_history` / `insurance_details`.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

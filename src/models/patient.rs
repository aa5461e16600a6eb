use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub profile_picture_url: Option<String>,
    pub insurance_details: JsonMap,
    pub medical_history: JsonMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted by `POST /patients`. `userId` is generated when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPatient {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub insurance_details: JsonMap,
    #[serde(default)]
    pub medical_history: JsonMap,
}

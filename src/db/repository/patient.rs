use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, map_constraint, now, parse_json_map, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{NewPatient, Patient};

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, user_id, username, profile_picture_url,
         insurance_details, medical_history, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            patient.id.to_string(),
            patient.user_id.to_string(),
            patient.username,
            patient.profile_picture_url,
            serde_json::Value::Object(patient.insurance_details.clone()).to_string(),
            serde_json::Value::Object(patient.medical_history.clone()).to_string(),
            format_timestamp(&patient.created_at),
            format_timestamp(&patient.updated_at),
        ],
    )
    .map_err(map_constraint)?;
    Ok(())
}

/// Assign identifiers and timestamps, then insert.
pub fn create_patient(conn: &Connection, new: NewPatient) -> Result<Patient, DatabaseError> {
    let ts = now();
    let patient = Patient {
        id: Uuid::new_v4(),
        user_id: new.user_id.unwrap_or_else(Uuid::new_v4),
        username: new.username,
        profile_picture_url: new.profile_picture_url,
        insurance_details: new.insurance_details,
        medical_history: new.medical_history,
        created_at: ts,
        updated_at: ts,
    };
    insert_patient(conn, &patient)?;
    Ok(patient)
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, user_id, username, profile_picture_url, insurance_details,
             medical_history, created_at, updated_at
             FROM patients WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )
        .optional()?;

    let Some((id, user_id, username, picture, insurance, history, created, updated)) = row else {
        return Ok(None);
    };
    Ok(Some(Patient {
        id: parse_uuid("id", &id)?,
        user_id: parse_uuid("user_id", &user_id)?,
        username,
        profile_picture_url: picture,
        insurance_details: parse_json_map("insurance_details", &insurance)?,
        medical_history: parse_json_map("medical_history", &history)?,
        created_at: parse_timestamp("created_at", &created)?,
        updated_at: parse_timestamp("updated_at", &updated)?,
    }))
}

/// Remove a patient together with their prescriptions and visits.
///
/// Dependents go first because the schema has no cascades. Call inside a
/// transaction so a failure part-way leaves nothing deleted. Returns `false`
/// when no such patient exists.
pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let key = id.to_string();
    let prescriptions = conn.execute("DELETE FROM prescriptions WHERE patient_id = ?1", params![key])?;
    let visits = conn.execute("DELETE FROM visits WHERE patient_id = ?1", params![key])?;
    let removed = conn.execute("DELETE FROM patients WHERE id = ?1", params![key])?;
    tracing::debug!(patient_id = %id, prescriptions, visits, removed, "Patient delete");
    Ok(removed > 0)
}

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{format_timestamp, map_constraint, now, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{NewPrescription, Prescription};

const SELECT_COLUMNS: &str =
    "SELECT id, patient_id, clinician_id, medication, dosage, frequency, notes, created_at
     FROM prescriptions";

type PrescriptionRow = (String, String, String, String, String, String, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<PrescriptionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn into_prescription(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    let (id, patient_id, clinician_id, medication, dosage, frequency, notes, created) = row;
    Ok(Prescription {
        id: parse_uuid("id", &id)?,
        patient_id: parse_uuid("patient_id", &patient_id)?,
        clinician_id: parse_uuid("clinician_id", &clinician_id)?,
        medication,
        dosage,
        frequency,
        notes,
        created_at: parse_timestamp("created_at", &created)?,
    })
}

/// Insert a prescription, assigning its id and creation time.
///
/// Unknown patient or clinician ids fail the foreign-key check and surface as
/// `ConstraintViolation`.
pub fn insert_prescription(
    conn: &Connection,
    new: &NewPrescription,
) -> Result<Prescription, DatabaseError> {
    let prescription = Prescription {
        id: Uuid::new_v4(),
        patient_id: new.patient_id,
        clinician_id: new.clinician_id,
        medication: new.medication.clone(),
        dosage: new.dosage.clone(),
        frequency: new.frequency.clone(),
        notes: new.notes.clone(),
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO prescriptions (id, patient_id, clinician_id, medication, dosage, frequency, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            prescription.id.to_string(),
            prescription.patient_id.to_string(),
            prescription.clinician_id.to_string(),
            prescription.medication,
            prescription.dosage,
            prescription.frequency,
            prescription.notes,
            format_timestamp(&prescription.created_at),
        ],
    )
    .map_err(map_constraint)?;
    Ok(prescription)
}

pub fn get_prescription(conn: &Connection, id: &Uuid) -> Result<Option<Prescription>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id.to_string()],
            read_row,
        )
        .optional()?;
    row.map(into_prescription).transpose()
}

/// All prescriptions for a patient, newest first.
pub fn get_prescriptions_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE patient_id = ?1 ORDER BY created_at DESC, id"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], read_row)?;

    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(into_prescription(row?)?);
    }
    Ok(prescriptions)
}

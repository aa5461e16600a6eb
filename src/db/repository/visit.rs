use chrono::SubsecRound;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, map_constraint, now, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{NewVisit, Visit};

pub fn create_visit(conn: &Connection, new: NewVisit) -> Result<Visit, DatabaseError> {
    let visit = Visit {
        id: Uuid::new_v4(),
        patient_id: new.patient_id,
        clinician_id: new.clinician_id,
        visit_date: new.visit_date.trunc_subsecs(6),
        reason: new.reason,
        notes: new.notes,
        created_at: now(),
    };
    conn.execute(
        "INSERT INTO visits (id, patient_id, clinician_id, visit_date, reason, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            visit.id.to_string(),
            visit.patient_id.to_string(),
            visit.clinician_id.to_string(),
            format_timestamp(&visit.visit_date),
            visit.reason,
            visit.notes,
            format_timestamp(&visit.created_at),
        ],
    )
    .map_err(map_constraint)?;
    Ok(visit)
}

pub fn get_visit(conn: &Connection, id: &Uuid) -> Result<Option<Visit>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, patient_id, clinician_id, visit_date, reason, notes, created_at
             FROM visits WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, String>(6)?,
                ))
            },
        )
        .optional()?;

    let Some((id, patient_id, clinician_id, visit_date, reason, notes, created)) = row else {
        return Ok(None);
    };
    Ok(Some(Visit {
        id: parse_uuid("id", &id)?,
        patient_id: parse_uuid("patient_id", &patient_id)?,
        clinician_id: parse_uuid("clinician_id", &clinician_id)?,
        visit_date: parse_timestamp("visit_date", &visit_date)?,
        reason,
        notes,
        created_at: parse_timestamp("created_at", &created)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{create_clinician, create_patient};
    use crate::db::sqlite::open_memory_database;
    use crate::models::{NewClinician, NewPatient};

    #[test]
    fn create_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let patient = create_patient(&conn, NewPatient::default()).unwrap();
        let clinician = create_clinician(&conn, NewClinician::default()).unwrap();

        let visit = create_visit(
            &conn,
            NewVisit {
                patient_id: patient.id,
                clinician_id: clinician.id,
                visit_date: chrono::Utc::now(),
                reason: Some("Follow-up".into()),
                notes: Some("Diagnosis: strep throat".into()),
            },
        )
        .unwrap();

        let loaded = get_visit(&conn, &visit.id).unwrap().unwrap();
        assert_eq!(loaded, visit);
    }

    #[test]
    fn unknown_clinician_rejected() {
        let conn = open_memory_database().unwrap();
        let patient = create_patient(&conn, NewPatient::default()).unwrap();
        let err = create_visit(
            &conn,
            NewVisit {
                patient_id: patient.id,
                clinician_id: Uuid::new_v4(),
                visit_date: chrono::Utc::now(),
                reason: None,
                notes: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }
}

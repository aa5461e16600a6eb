use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{format_timestamp, map_constraint, now, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{Clinician, NewClinician};

pub fn insert_clinician(conn: &Connection, clinician: &Clinician) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO clinicians (id, user_id, username, profile_picture_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            clinician.id.to_string(),
            clinician.user_id.to_string(),
            clinician.username,
            clinician.profile_picture_url,
            format_timestamp(&clinician.created_at),
            format_timestamp(&clinician.updated_at),
        ],
    )
    .map_err(map_constraint)?;
    Ok(())
}

pub fn create_clinician(conn: &Connection, new: NewClinician) -> Result<Clinician, DatabaseError> {
    let ts = now();
    let clinician = Clinician {
        id: Uuid::new_v4(),
        user_id: new.user_id.unwrap_or_else(Uuid::new_v4),
        username: new.username,
        profile_picture_url: new.profile_picture_url,
        created_at: ts,
        updated_at: ts,
    };
    insert_clinician(conn, &clinician)?;
    Ok(clinician)
}

pub fn get_clinician(conn: &Connection, id: &Uuid) -> Result<Option<Clinician>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, user_id, username, profile_picture_url, created_at, updated_at
             FROM clinicians WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, user_id, username, picture, created, updated)) = row else {
        return Ok(None);
    };
    Ok(Some(Clinician {
        id: parse_uuid("id", &id)?,
        user_id: parse_uuid("user_id", &user_id)?,
        username,
        profile_picture_url: picture,
        created_at: parse_timestamp("created_at", &created)?,
        updated_at: parse_timestamp("updated_at", &updated)?,
    }))
}

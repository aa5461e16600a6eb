//! Repository layer: entity-scoped database operations.
//!
//! Free functions over `&Connection` so callers can run them either on the
//! shared connection or inside a `Transaction` (which derefs to one).

mod clinician;
mod patient;
mod prescription;
mod visit;

use chrono::{DateTime, SubsecRound, Utc};
use rusqlite::ErrorCode;
use uuid::Uuid;

use super::DatabaseError;
use crate::models::JsonMap;

pub use clinician::*;
pub use patient::*;
pub use prescription::*;
pub use visit::*;

/// Current time at the precision timestamps are stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(column: &'static str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptColumn {
            column,
            reason: e.to_string(),
        })
}

pub(crate) fn parse_uuid(column: &'static str, raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

pub(crate) fn parse_json_map(column: &'static str, raw: &str) -> Result<JsonMap, DatabaseError> {
    serde_json::from_str(raw).map_err(|e| DatabaseError::CorruptColumn {
        column,
        reason: e.to_string(),
    })
}

/// UNIQUE / FOREIGN KEY failures become `ConstraintViolation` so the API
/// layer can answer 409 instead of 500.
pub(crate) fn map_constraint(err: rusqlite::Error) -> DatabaseError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            DatabaseError::ConstraintViolation(
                msg.clone().unwrap_or_else(|| "constraint failed".to_string()),
            )
        }
        _ => DatabaseError::Sqlite(err),
    }
}

//! System repository — named equipment locations within a job.

use rusqlite::{params, Connection, Row};

use crate::model::System;

use super::{Database, DatabaseError};

fn from_row(row: &Row<'_>) -> Result<System, rusqlite::Error> {
    Ok(System {
        id: row.get("id")?,
        job_id: row.get("job_id")?,
        name: row.get("name")?,
    })
}

pub(crate) fn insert_with_conn(conn: &Connection, system: &System) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO systems (id, job_id, name) VALUES (?1, ?2, ?3)",
        params![system.id, system.job_id, system.name],
    )?;
    Ok(())
}

pub fn insert(db: &Database, system: &System) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_with_conn(conn, system))
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<System>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM systems WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id], from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// All systems declared on a job, in name order.
pub fn find_by_job(db: &Database, job_id: &str) -> Result<Vec<System>, DatabaseError> {
    db.with_conn(|conn| find_by_job_with_conn(conn, job_id))
}

pub(crate) fn find_by_job_with_conn(
    conn: &Connection,
    job_id: &str,
) -> Result<Vec<System>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT * FROM systems WHERE job_id = ?1 ORDER BY name ASC")?;
    let rows: Vec<System> = stmt
        .query_map(params![job_id], from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Looks up a system by its unique (job, name) key.
pub fn find_by_name(db: &Database, job_id: &str, name: &str) -> Result<Option<System>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM systems WHERE job_id = ?1 AND name = ?2")?;
        let mut rows = stmt.query_map(params![job_id, name], from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Deletes a system. Equipment rows cascade; callers must ensure no test
/// runs still reference it.
pub fn delete(db: &Database, id: &str) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute("DELETE FROM systems WHERE id = ?1", params![id])?;
        Ok(())
    })
}

//! Job-event repository. Insert-only: the timeline is an audit trail, so no
//! update or delete operation exists here.

use rusqlite::{params, Connection, Row};

use crate::model::JobEvent;

use super::{Database, DatabaseError};

fn from_row(row: &Row<'_>) -> Result<JobEvent, DatabaseError> {
    let meta: String = row.get("meta")?;
    Ok(JobEvent {
        id: row.get("id")?,
        job_id: row.get("job_id")?,
        event_type: row.get("event_type")?,
        meta: serde_json::from_str(&meta).map_err(|e| DatabaseError::Decode {
            table: "job_events",
            reason: format!("bad meta JSON: {e}"),
        })?,
        actor: row.get("actor")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn insert_with_conn(conn: &Connection, event: &JobEvent) -> Result<(), DatabaseError> {
    let meta = serde_json::to_string(&event.meta).map_err(|e| DatabaseError::Decode {
        table: "job_events",
        reason: format!("unserializable meta: {e}"),
    })?;
    conn.execute(
        "INSERT INTO job_events (id, job_id, event_type, meta, actor, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.id,
            event.job_id,
            event.event_type,
            meta,
            event.actor,
            event.created_at,
        ],
    )?;
    Ok(())
}

pub fn insert(db: &Database, event: &JobEvent) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_with_conn(conn, event))
}

/// Full timeline for a job, oldest first.
pub fn find_by_job(db: &Database, job_id: &str) -> Result<Vec<JobEvent>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("SELECT * FROM job_events WHERE job_id = ?1 ORDER BY created_at ASC, id ASC")?;
        let mut rows = stmt.query(params![job_id])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(from_row(row)?);
        }
        Ok(events)
    })
}

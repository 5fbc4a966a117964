//! Visit repository — numbered on-site attendances per job.

use rusqlite::{params, Row};

use crate::model::{Visit, VisitOutcome, VisitStatus};

use super::{Database, DatabaseError};

fn from_row(row: &Row<'_>) -> Result<Visit, DatabaseError> {
    let status: String = row.get("status")?;
    let outcome: Option<String> = row.get("outcome")?;
    Ok(Visit {
        id: row.get("id")?,
        job_id: row.get("job_id")?,
        visit_number: row.get("visit_number")?,
        status: VisitStatus::parse(&status).ok_or_else(|| DatabaseError::Decode {
            table: "visits",
            reason: format!("unknown status '{status}'"),
        })?,
        outcome: outcome
            .map(|o| {
                VisitOutcome::parse(&o).ok_or_else(|| DatabaseError::Decode {
                    table: "visits",
                    reason: format!("unknown outcome '{o}'"),
                })
            })
            .transpose()?,
        needs_another_visit: row.get("needs_another_visit")?,
        scheduled_for: row.get("scheduled_for")?,
    })
}

pub fn insert(db: &Database, visit: &Visit) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO visits (id, job_id, visit_number, status, outcome,
             needs_another_visit, scheduled_for)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                visit.id,
                visit.job_id,
                visit.visit_number,
                visit.status.as_str(),
                visit.outcome.map(|o| o.as_str()),
                visit.needs_another_visit,
                visit.scheduled_for,
            ],
        )?;
        Ok(())
    })
}

pub fn update(db: &Database, visit: &Visit) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE visits SET status=?2, outcome=?3, needs_another_visit=?4, scheduled_for=?5
             WHERE id=?1",
            params![
                visit.id,
                visit.status.as_str(),
                visit.outcome.map(|o| o.as_str()),
                visit.needs_another_visit,
                visit.scheduled_for,
            ],
        )?;
        Ok(())
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Visit>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM visits WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    })
}

pub fn find_by_job(db: &Database, job_id: &str) -> Result<Vec<Visit>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM visits WHERE job_id = ?1 ORDER BY visit_number ASC")?;
        let mut rows = stmt.query(params![job_id])?;
        let mut visits = Vec::new();
        while let Some(row) = rows.next()? {
            visits.push(from_row(row)?);
        }
        Ok(visits)
    })
}

/// The highest-numbered visit for a job, if any.
pub fn latest_for_job(db: &Database, job_id: &str) -> Result<Option<Visit>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("SELECT * FROM visits WHERE job_id = ?1 ORDER BY visit_number DESC LIMIT 1")?;
        let mut rows = stmt.query(params![job_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    })
}

/// Next free visit number for a job (1 for the first).
pub fn next_visit_number(db: &Database, job_id: &str) -> Result<i64, DatabaseError> {
    db.with_conn(|conn| {
        let max: i64 = conn.query_row(
            "SELECT COALESCE(MAX(visit_number), 0) FROM visits WHERE job_id = ?1",
            params![job_id],
            |r| r.get(0),
        )?;
        Ok(max + 1)
    })
}

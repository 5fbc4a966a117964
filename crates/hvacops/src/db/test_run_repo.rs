//! Test-run repository.

use rusqlite::{params, Row};

use crate::model::{Evaluation, TestData, TestRun, TestType};

use super::{Database, DatabaseError};

fn from_row(row: &Row<'_>) -> Result<TestRun, DatabaseError> {
    let test_type: String = row.get("test_type")?;
    let data: Option<String> = row.get("data")?;
    let computed: Option<String> = row.get("computed")?;

    Ok(TestRun {
        id: row.get("id")?,
        job_id: row.get("job_id")?,
        visit_id: row.get("visit_id")?,
        system_id: row.get("system_id")?,
        test_type: TestType::parse(&test_type).ok_or_else(|| DatabaseError::Decode {
            table: "test_runs",
            reason: format!("unknown test_type '{test_type}'"),
        })?,
        data: data
            .map(|d| {
                serde_json::from_str::<TestData>(&d).map_err(|e| DatabaseError::Decode {
                    table: "test_runs",
                    reason: format!("bad data JSON: {e}"),
                })
            })
            .transpose()?,
        computed: computed
            .map(|c| {
                serde_json::from_str::<Evaluation>(&c).map_err(|e| DatabaseError::Decode {
                    table: "test_runs",
                    reason: format!("bad computed JSON: {e}"),
                })
            })
            .transpose()?,
        computed_pass: row.get("computed_pass")?,
        override_pass: row.get("override_pass")?,
        override_reason: row.get("override_reason")?,
        is_completed: row.get("is_completed")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn data_json(run: &TestRun) -> Result<Option<String>, DatabaseError> {
    run.data
        .as_ref()
        .map(|d| {
            serde_json::to_string(d).map_err(|e| DatabaseError::Decode {
                table: "test_runs",
                reason: format!("unserializable data: {e}"),
            })
        })
        .transpose()
}

fn computed_json(run: &TestRun) -> Result<Option<String>, DatabaseError> {
    run.computed
        .as_ref()
        .map(|c| {
            serde_json::to_string(c).map_err(|e| DatabaseError::Decode {
                table: "test_runs",
                reason: format!("unserializable computed: {e}"),
            })
        })
        .transpose()
}

pub fn insert(db: &Database, run: &TestRun) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO test_runs (id, job_id, visit_id, system_id, test_type, data, computed,
             computed_pass, override_pass, override_reason, is_completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                run.id,
                run.job_id,
                run.visit_id,
                run.system_id,
                run.test_type.as_str(),
                data_json(run)?,
                computed_json(run)?,
                run.computed_pass,
                run.override_pass,
                run.override_reason,
                run.is_completed,
                run.created_at,
                run.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Overwrites the mutable fields of a run.
pub fn update(db: &Database, run: &TestRun) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE test_runs SET system_id=?2, data=?3, computed=?4, computed_pass=?5,
             override_pass=?6, override_reason=?7, is_completed=?8, updated_at=?9
             WHERE id=?1",
            params![
                run.id,
                run.system_id,
                data_json(run)?,
                computed_json(run)?,
                run.computed_pass,
                run.override_pass,
                run.override_reason,
                run.is_completed,
                run.updated_at,
            ],
        )?;
        Ok(())
    })
}

pub fn find_by_id(db: &Database, id: &str) -> Result<Option<TestRun>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM test_runs WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    })
}

pub fn find_by_job(db: &Database, job_id: &str) -> Result<Vec<TestRun>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM test_runs WHERE job_id = ?1 ORDER BY created_at ASC")?;
        let mut rows = stmt.query(params![job_id])?;
        let mut runs = Vec::new();
        while let Some(row) = rows.next()? {
            runs.push(from_row(row)?);
        }
        Ok(runs)
    })
}

/// Finds the run for a (job, visit, system, test_type) key, preferring the
/// completed one when duplicates exist.
pub fn find_for_key(
    db: &Database,
    job_id: &str,
    visit_id: &str,
    system_id: &str,
    test_type: TestType,
) -> Result<Option<TestRun>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT * FROM test_runs
             WHERE job_id = ?1 AND visit_id = ?2 AND system_id = ?3 AND test_type = ?4
             ORDER BY is_completed DESC, created_at ASC LIMIT 1",
        )?;
        let mut rows = stmt.query(params![job_id, visit_id, system_id, test_type.as_str()])?;
        match rows.next()? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    })
}

pub fn delete(db: &Database, id: &str) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute("DELETE FROM test_runs WHERE id = ?1", params![id])?;
        Ok(())
    })
}

/// Removes data-less, uncompleted duplicates of a run's key, keeping the
/// given run. Legacy reconciliation for rows predating the partial unique
/// index; harmless otherwise.
pub fn delete_incomplete_duplicates(db: &Database, keep: &TestRun) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let deleted = conn.execute(
            "DELETE FROM test_runs
             WHERE job_id = ?1 AND visit_id = ?2 AND system_id = ?3 AND test_type = ?4
               AND id != ?5 AND is_completed = 0 AND data IS NULL AND computed IS NULL",
            params![
                keep.job_id,
                keep.visit_id,
                keep.system_id,
                keep.test_type.as_str(),
                keep.id,
            ],
        )?;
        Ok(deleted as u64)
    })
}

/// Count of runs anchored to a system (orphan-cleanup check).
pub fn count_by_system(db: &Database, system_id: &str) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM test_runs WHERE system_id = ?1",
            params![system_id],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

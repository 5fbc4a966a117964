//! Job repository — CRUD operations for the `jobs` table.

use rusqlite::{params, Connection, Row};

use crate::model::{Job, JobType, OpsStatus, ProjectType};

use super::{Database, DatabaseError};

fn from_row(row: &Row<'_>) -> Result<Job, DatabaseError> {
    let job_type: String = row.get("job_type")?;
    let project_type: String = row.get("project_type")?;
    let ops_status: String = row.get("ops_status")?;
    let billing: Option<String> = row.get("billing_snapshot")?;

    Ok(Job {
        id: row.get("id")?,
        job_type: JobType::parse(&job_type).ok_or_else(|| DatabaseError::Decode {
            table: "jobs",
            reason: format!("unknown job_type '{job_type}'"),
        })?,
        project_type: ProjectType::parse(&project_type).ok_or_else(|| DatabaseError::Decode {
            table: "jobs",
            reason: format!("unknown project_type '{project_type}'"),
        })?,
        ops_status: OpsStatus::parse(&ops_status).ok_or_else(|| DatabaseError::Decode {
            table: "jobs",
            reason: format!("unknown ops_status '{ops_status}'"),
        })?,
        parent_job_id: row.get("parent_job_id")?,
        customer_name: row.get("customer_name")?,
        site_address: row.get("site_address")?,
        billing_snapshot: billing
            .map(|b| {
                serde_json::from_str(&b).map_err(|e| DatabaseError::Decode {
                    table: "jobs",
                    reason: format!("bad billing_snapshot JSON: {e}"),
                })
            })
            .transpose()?,
        scheduled_for: row.get("scheduled_for")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn billing_json(job: &Job) -> Result<Option<String>, DatabaseError> {
    job.billing_snapshot
        .as_ref()
        .map(|v| {
            serde_json::to_string(v).map_err(|e| DatabaseError::Decode {
                table: "jobs",
                reason: format!("unserializable billing_snapshot: {e}"),
            })
        })
        .transpose()
}

/// Connection-level insert, composable inside a transaction.
pub(crate) fn insert_with_conn(conn: &Connection, job: &Job) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO jobs (id, job_type, project_type, ops_status, parent_job_id,
         customer_name, site_address, billing_snapshot, scheduled_for, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            job.id,
            job.job_type.as_str(),
            job.project_type.as_str(),
            job.ops_status.as_str(),
            job.parent_job_id,
            job.customer_name,
            job.site_address,
            billing_json(job)?,
            job.scheduled_for,
            job.created_at,
            job.updated_at,
        ],
    )?;
    Ok(())
}

/// Inserts a new job row.
pub fn insert(db: &Database, job: &Job) -> Result<(), DatabaseError> {
    db.with_conn(|conn| insert_with_conn(conn, job))
}

/// Updates an existing job row. All fields except `id` and `created_at` are
/// overwritten.
pub fn update(db: &Database, job: &Job) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE jobs SET job_type=?2, project_type=?3, ops_status=?4, parent_job_id=?5,
             customer_name=?6, site_address=?7, billing_snapshot=?8, scheduled_for=?9,
             updated_at=?10
             WHERE id=?1",
            params![
                job.id,
                job.job_type.as_str(),
                job.project_type.as_str(),
                job.ops_status.as_str(),
                job.parent_job_id,
                job.customer_name,
                job.site_address,
                billing_json(job)?,
                job.scheduled_for,
                job.updated_at,
            ],
        )?;
        Ok(())
    })
}

/// Finds a job by its ID.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<Job>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM jobs WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(from_row(row)?)),
            None => Ok(None),
        }
    })
}

/// Updates only the ops_status and updated_at of a job.
pub fn update_ops_status(
    db: &Database,
    id: &str,
    status: OpsStatus,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE jobs SET ops_status = ?2, updated_at = ?3 WHERE id = ?1",
            params![id, status.as_str(), updated_at],
        )?;
        Ok(())
    })
}

/// Jobs whose parent is the given job (its retests), oldest first.
pub fn find_by_parent(db: &Database, parent_job_id: &str) -> Result<Vec<Job>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt =
            conn.prepare("SELECT * FROM jobs WHERE parent_job_id = ?1 ORDER BY created_at ASC")?;
        let mut rows = stmt.query(params![parent_job_id])?;
        let mut jobs = Vec::new();
        while let Some(row) = rows.next()? {
            jobs.push(from_row(row)?);
        }
        Ok(jobs)
    })
}

/// Query filter for the ops dashboard and call lists.
#[derive(Debug, Default, Clone)]
pub struct JobFilter {
    pub ops_status: Option<OpsStatus>,
    pub job_type: Option<JobType>,
    pub exclude_status: Option<OpsStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Queries jobs with filters, returning (rows, total_count).
pub fn query(db: &Database, filter: &JobFilter) -> Result<(Vec<Job>, u64), DatabaseError> {
    db.with_conn(|conn| {
        let mut conditions = Vec::new();
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(status) = filter.ops_status {
            conditions.push(format!("ops_status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.as_str().to_string()));
        }
        if let Some(job_type) = filter.job_type {
            conditions.push(format!("job_type = ?{}", param_values.len() + 1));
            param_values.push(Box::new(job_type.as_str().to_string()));
        }
        if let Some(exclude) = filter.exclude_status {
            conditions.push(format!("ops_status != ?{}", param_values.len() + 1));
            param_values.push(Box::new(exclude.as_str().to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM jobs {}", where_clause);
        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let total: u64 = conn.query_row(&count_sql, params_ref.as_slice(), |r| r.get(0))?;

        let limit = filter.limit.unwrap_or(100) as i64;
        let offset = filter.offset.unwrap_or(0) as i64;
        param_values.push(Box::new(limit));
        param_values.push(Box::new(offset));
        let query_sql = format!(
            "SELECT * FROM jobs {} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            where_clause,
            param_values.len() - 1,
            param_values.len()
        );

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&query_sql)?;
        let mut rows = stmt.query(params_ref.as_slice())?;
        let mut jobs = Vec::new();
        while let Some(row) = rows.next()? {
            jobs.push(from_row(row)?);
        }

        Ok((jobs, total))
    })
}

/// Counts jobs sitting in the given ops status (dashboard tiles).
pub fn count_by_ops_status(db: &Database, status: OpsStatus) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE ops_status = ?1",
            params![status.as_str()],
            |r| r.get(0),
        )?;
        Ok(count)
    })
}

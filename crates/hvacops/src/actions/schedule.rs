//! Scheduling actions. These are explicit operator moves, so they use the
//! forcing status setter.

use tracing::info;

use crate::db::{event_repo, job_repo, visit_repo, Database};
use crate::error::{Result, ValidationError};
use crate::model::{
    new_id, now_rfc3339, Job, JobEvent, OpsStatus, Visit, VisitStatus,
};

use crate::lifecycle::force_set_ops_status;

/// Schedules (or reschedules) a job: stores the date, forces the job into
/// `scheduled`, and anchors a visit for the date. An open visit is reused;
/// otherwise the next-numbered visit is created.
pub fn schedule_job(
    db: &Database,
    job_id: &str,
    scheduled_for: &str,
    actor: Option<&str>,
) -> Result<Visit> {
    let mut job = find_job(db, job_id)?;

    job.scheduled_for = Some(scheduled_for.to_string());
    job.updated_at = now_rfc3339();
    job_repo::update(db, &job)?;
    force_set_ops_status(db, &mut job, OpsStatus::Scheduled, "schedule", actor)?;

    let visit = match visit_repo::latest_for_job(db, &job.id)? {
        Some(mut visit) if visit.status != VisitStatus::Completed => {
            visit.status = VisitStatus::Scheduled;
            visit.scheduled_for = Some(scheduled_for.to_string());
            visit_repo::update(db, &visit)?;
            visit
        }
        latest => {
            let visit = Visit {
                id: new_id(),
                job_id: job.id.clone(),
                visit_number: latest.map(|v| v.visit_number).unwrap_or(0) + 1,
                status: VisitStatus::Scheduled,
                outcome: None,
                needs_another_visit: false,
                scheduled_for: Some(scheduled_for.to_string()),
            };
            visit_repo::insert(db, &visit)?;
            visit
        }
    };

    event_repo::insert(
        db,
        &JobEvent::new(
            &job.id,
            "visit_scheduled",
            serde_json::json!({
                "visit_id": visit.id,
                "visit_number": visit.visit_number,
                "scheduled_for": scheduled_for,
            }),
            actor,
        ),
    )?;

    info!(job_id = %job.id, visit_number = visit.visit_number, scheduled_for, "visit scheduled");
    Ok(visit)
}

/// Flags a visit as needing a follow-up attendance (technician call).
pub fn request_another_visit(db: &Database, visit_id: &str) -> Result<Visit> {
    let mut visit =
        visit_repo::find_by_id(db, visit_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "visit",
            id: visit_id.to_string(),
        })?;
    visit.needs_another_visit = true;
    visit_repo::update(db, &visit)?;
    Ok(visit)
}

fn find_job(db: &Database, job_id: &str) -> Result<Job> {
    Ok(
        job_repo::find_by_id(db, job_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "job",
            id: job_id.to_string(),
        })?,
    )
}

//! Service-job flow. Service jobs skip compliance testing entirely and run
//! the short lifecycle: scheduled → invoice_required → closed.

use crate::db::{event_repo, job_repo, Database};
use crate::error::{DomainError, Result, ValidationError};
use crate::model::{Job, JobEvent, JobType, OpsStatus};

use crate::lifecycle::set_ops_status_if_not_manual;

/// Marks the field work on a service job done; the job moves to
/// `invoice_required` unless a manual lock holds it.
pub fn mark_service_complete(db: &Database, job_id: &str, actor: Option<&str>) -> Result<Job> {
    let mut job = find_service_job(db, job_id)?;
    set_ops_status_if_not_manual(db, &mut job, OpsStatus::InvoiceRequired, "service", actor)?;
    event_repo::insert(
        db,
        &JobEvent::new(&job.id, "service_completed", serde_json::json!({}), actor),
    )?;
    Ok(job)
}

/// Records the invoice as sent and closes the service job.
pub fn mark_invoice_sent(db: &Database, job_id: &str, actor: Option<&str>) -> Result<Job> {
    let mut job = find_service_job(db, job_id)?;
    set_ops_status_if_not_manual(db, &mut job, OpsStatus::Closed, "service", actor)?;
    event_repo::insert(
        db,
        &JobEvent::new(&job.id, "invoice_sent", serde_json::json!({}), actor),
    )?;
    Ok(job)
}

fn find_service_job(db: &Database, job_id: &str) -> Result<Job> {
    let job = job_repo::find_by_id(db, job_id)?.ok_or_else(|| ValidationError::NotFound {
        entity: "job",
        id: job_id.to_string(),
    })?;
    if job.job_type != JobType::Service {
        return Err(DomainError::WrongJobType {
            job_id: job.id,
            expected: "service",
        }
        .into());
    }
    Ok(job)
}

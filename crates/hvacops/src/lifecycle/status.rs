//! Ops-Status State Machine.
//!
//! Two setters, one contract: the lock-respecting setter skips the write when
//! the job sits in a manually-locked status, the forcing setter is reserved
//! for explicit operator actions. Every applied transition is paired with an
//! immutable `status_changed` timeline event.

use tracing::debug;

use crate::db::{event_repo, job_repo, Database};
use crate::error::Result;
use crate::model::{now_rfc3339, Job, JobEvent, OpsStatus};

/// Initial status at intake: `scheduled` when a date was supplied, else
/// `need_to_schedule`.
pub fn initial_ops_status(scheduled_for: Option<&str>) -> OpsStatus {
    if scheduled_for.is_some() {
        OpsStatus::Scheduled
    } else {
        OpsStatus::NeedToSchedule
    }
}

/// Applies `next` unless the job's current status is manually locked, in
/// which case the write is silently skipped (the lock wins). Returns whether
/// the transition was applied.
pub fn set_ops_status_if_not_manual(
    db: &Database,
    job: &mut Job,
    next: OpsStatus,
    source: &str,
    actor: Option<&str>,
) -> Result<bool> {
    if job.ops_status.is_manual_lock() {
        debug!(
            job_id = %job.id,
            current = job.ops_status.as_str(),
            next = next.as_str(),
            source,
            "ops status locked, skipping automatic transition"
        );
        return Ok(false);
    }
    apply(db, job, next, source, actor, false)
}

/// Applies `next` unconditionally, bypassing the manual lock. Reserved for
/// explicit operator actions. Returns whether a transition happened (false
/// only when `next` equals the current status).
pub fn force_set_ops_status(
    db: &Database,
    job: &mut Job,
    next: OpsStatus,
    source: &str,
    actor: Option<&str>,
) -> Result<bool> {
    apply(db, job, next, source, actor, true)
}

fn apply(
    db: &Database,
    job: &mut Job,
    next: OpsStatus,
    source: &str,
    actor: Option<&str>,
    forced: bool,
) -> Result<bool> {
    if job.ops_status == next {
        return Ok(false);
    }

    let from = job.ops_status;
    let updated_at = now_rfc3339();
    job_repo::update_ops_status(db, &job.id, next, &updated_at)?;
    event_repo::insert(
        db,
        &JobEvent::new(
            &job.id,
            "status_changed",
            serde_json::json!({
                "from": from.as_str(),
                "to": next.as_str(),
                "source": source,
                "forced": forced,
            }),
            actor,
        ),
    )?;

    debug!(
        job_id = %job.id,
        from = from.as_str(),
        to = next.as_str(),
        source,
        forced,
        "ops status transition applied"
    );

    job.ops_status = next;
    job.updated_at = updated_at;
    Ok(true)
}

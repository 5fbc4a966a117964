//! Retest Linker.
//!
//! A failed job can spawn a child "retest" job that re-attempts compliance
//! testing. The linker keeps both timelines in sync and auto-resolves the
//! parent when the retest later passes.

use tracing::info;

use crate::db::{equipment_repo, event_repo, job_repo, system_repo, Database};
use crate::error::{Result, ValidationError};
use crate::model::{new_id, now_rfc3339, Equipment, Job, JobEvent, OpsStatus, System};

use super::status::force_set_ops_status;

/// Creates a retest job for the given parent: `parent_job_id` set, status
/// `need_to_schedule`, customer/site/billing snapshot carried over. With
/// `clone_equipment`, every system and equipment row is deep-cloned with
/// fresh ids. The whole operation runs in one transaction; a clone failure
/// leaves no partial retest behind.
pub fn create_retest(
    db: &Database,
    parent_job_id: &str,
    clone_equipment: bool,
    actor: Option<&str>,
) -> Result<Job> {
    let parent =
        job_repo::find_by_id(db, parent_job_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "job",
            id: parent_job_id.to_string(),
        })?;

    let now = now_rfc3339();
    let child = Job {
        id: new_id(),
        job_type: parent.job_type,
        project_type: parent.project_type,
        ops_status: OpsStatus::NeedToSchedule,
        parent_job_id: Some(parent.id.clone()),
        customer_name: parent.customer_name.clone(),
        site_address: parent.site_address.clone(),
        billing_snapshot: parent.billing_snapshot.clone(),
        scheduled_for: None,
        created_at: now.clone(),
        updated_at: now,
    };

    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;

        job_repo::insert_with_conn(&tx, &child)?;

        if clone_equipment {
            for system in system_repo::find_by_job_with_conn(&tx, &parent.id)? {
                let cloned_system = System {
                    id: new_id(),
                    job_id: child.id.clone(),
                    name: system.name.clone(),
                };
                system_repo::insert_with_conn(&tx, &cloned_system)?;

                for item in equipment_repo::find_by_system_with_conn(&tx, &system.id)? {
                    let cloned_item = Equipment {
                        id: new_id(),
                        system_id: cloned_system.id.clone(),
                        ..item
                    };
                    equipment_repo::insert_with_conn(&tx, &cloned_item)?;
                }
            }
        }

        event_repo::insert_with_conn(
            &tx,
            &JobEvent::new(
                &parent.id,
                "retest_created",
                serde_json::json!({ "retest_job_id": child.id, "cloned_equipment": clone_equipment }),
                actor,
            ),
        )?;
        event_repo::insert_with_conn(
            &tx,
            &JobEvent::new(
                &child.id,
                "retest_of",
                serde_json::json!({ "parent_job_id": parent.id }),
                actor,
            ),
        )?;

        tx.commit()?;
        Ok(())
    })?;

    info!(parent_job_id = %parent.id, retest_job_id = %child.id, "retest created");
    Ok(child)
}

/// Called after test-run completion with the job's ops_status captured before
/// and after aggregation. When a retest job just transitioned into
/// `paperwork_required` (pass) or `failed`, records timeline events on both
/// sides; on pass, a parent still sitting in `failed` or `retest_needed` is
/// forced to `closed`.
pub fn reconcile_parent_after_completion(
    db: &Database,
    job: &Job,
    before: OpsStatus,
    after: OpsStatus,
    actor: Option<&str>,
) -> Result<()> {
    if before == after {
        return Ok(());
    }
    let Some(parent_job_id) = job.parent_job_id.as_deref() else {
        return Ok(());
    };

    let outcome = match after {
        OpsStatus::PaperworkRequired => "pass",
        OpsStatus::Failed => "fail",
        _ => return Ok(()),
    };

    event_repo::insert(
        db,
        &JobEvent::new(
            &job.id,
            "retest_completed",
            serde_json::json!({ "outcome": outcome, "parent_job_id": parent_job_id }),
            actor,
        ),
    )?;
    event_repo::insert(
        db,
        &JobEvent::new(
            parent_job_id,
            "retest_child_completed",
            serde_json::json!({ "outcome": outcome, "retest_job_id": job.id }),
            actor,
        ),
    )?;

    if outcome == "pass" {
        if let Some(mut parent) = job_repo::find_by_id(db, parent_job_id)? {
            if matches!(
                parent.ops_status,
                OpsStatus::Failed | OpsStatus::RetestNeeded
            ) {
                force_set_ops_status(db, &mut parent, OpsStatus::Closed, "retest_resolution", actor)?;
                info!(
                    parent_job_id = %parent.id,
                    retest_job_id = %job.id,
                    "parent auto-resolved to closed after passing retest"
                );
            }
        }
    }

    Ok(())
}

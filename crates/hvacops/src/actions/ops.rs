//! Back-office operations: manual status edits, contact logging, retests.

use tracing::info;

use crate::db::{event_repo, job_repo, Database};
use crate::error::{Result, ValidationError};
use crate::form::{self, FormData};
use crate::lifecycle::{create_retest, force_set_ops_status};
use crate::model::{Job, JobEvent, OpsStatus};

/// Manually sets a job's ops status. Manual edits always win, including
/// moving into or out of a locked status.
pub fn set_ops_status_manual(
    db: &Database,
    job_id: &str,
    status: OpsStatus,
    actor: Option<&str>,
) -> Result<Job> {
    let mut job = find_job(db, job_id)?;
    force_set_ops_status(db, &mut job, status, "manual_edit", actor)?;
    Ok(job)
}

/// Records a contact attempt on the job timeline. Pure bookkeeping; the
/// status machine is untouched.
pub fn log_contact_attempt(
    db: &Database,
    job_id: &str,
    note: Option<&str>,
    actor: Option<&str>,
) -> Result<()> {
    let job = find_job(db, job_id)?;
    event_repo::insert(
        db,
        &JobEvent::new(
            &job.id,
            "contact_attempted",
            serde_json::json!({ "note": note }),
            actor,
        ),
    )?;
    info!(job_id = %job.id, "contact attempt logged");
    Ok(())
}

/// Form-bound retest creation. `clone_equipment` defaults to carrying the
/// parent's systems over, since a retest re-measures the same installation.
pub fn create_retest_from_form(db: &Database, form: &FormData, actor: Option<&str>) -> Result<Job> {
    let parent_job_id = form::require(form, "job_id")?;
    let clone_equipment = form::flag(form, "clone_equipment").unwrap_or(true);
    create_retest(db, &parent_job_id, clone_equipment, actor)
}

fn find_job(db: &Database, job_id: &str) -> Result<Job> {
    Ok(
        job_repo::find_by_id(db, job_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "job",
            id: job_id.to_string(),
        })?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::intake::{create_job, JobIntake};
    use crate::db::system_repo;
    use crate::model::{JobType, ProjectType};

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ecc_job(db: &Database) -> Job {
        create_job(
            db,
            JobIntake {
                job_type: JobType::Ecc,
                project_type: ProjectType::Alteration,
                customer_name: Some("Acme".to_string()),
                site_address: None,
                billing_snapshot: None,
                scheduled_for: None,
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_manual_edit_sets_locked_status() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db);

        let job = set_ops_status_manual(&db, &job.id, OpsStatus::OnHold, Some("ops@example.com"))
            .unwrap();
        assert_eq!(job.ops_status, OpsStatus::OnHold);

        let events = event_repo::find_by_job(&db, &job.id).unwrap();
        assert!(events.iter().any(|e| e.event_type == "status_changed"));
    }

    #[test]
    fn test_contact_attempt_leaves_status_alone() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db);
        let before = job.ops_status;

        log_contact_attempt(&db, &job.id, Some("left voicemail"), None).unwrap();

        let job = job_repo::find_by_id(&db, &job.id).unwrap().unwrap();
        assert_eq!(job.ops_status, before);
        let events = event_repo::find_by_job(&db, &job.id).unwrap();
        assert!(events.iter().any(|e| e.event_type == "contact_attempted"));
    }

    #[test]
    fn test_retest_form_defaults_to_cloning() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db);
        crate::actions::equipment::add_equipment_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_label", "Upstairs"),
                ("role", "outdoor"),
            ]),
            None,
        )
        .unwrap();

        let child = create_retest_from_form(&db, &form(&[("job_id", &job.id)]), None).unwrap();
        assert_eq!(child.parent_job_id.as_deref(), Some(job.id.as_str()));
        assert_eq!(system_repo::find_by_job(&db, &child.id).unwrap().len(), 1);

        let bare = create_retest_from_form(
            &db,
            &form(&[("job_id", &job.id), ("clone_equipment", "no")]),
            None,
        )
        .unwrap();
        assert!(system_repo::find_by_job(&db, &bare.id).unwrap().is_empty());
    }
}

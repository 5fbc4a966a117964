//! Job intake.

use tracing::info;

use crate::db::{event_repo, job_repo, Database};
use crate::error::{Result, ValidationError};
use crate::form::{self, FormData};
use crate::lifecycle::initial_ops_status;
use crate::model::{new_id, now_rfc3339, Job, JobEvent, JobType, ProjectType};

/// Typed intake parameters, for hosts that bypass the form layer.
#[derive(Debug, Clone)]
pub struct JobIntake {
    pub job_type: JobType,
    pub project_type: ProjectType,
    pub customer_name: Option<String>,
    pub site_address: Option<String>,
    pub billing_snapshot: Option<serde_json::Value>,
    pub scheduled_for: Option<String>,
}

/// Creates a job at intake. Initial ops status is `scheduled` when a
/// scheduled date was supplied, else `need_to_schedule`.
pub fn create_job(db: &Database, intake: JobIntake, actor: Option<&str>) -> Result<Job> {
    let now = now_rfc3339();
    let job = Job {
        id: new_id(),
        job_type: intake.job_type,
        project_type: intake.project_type,
        ops_status: initial_ops_status(intake.scheduled_for.as_deref()),
        parent_job_id: None,
        customer_name: intake.customer_name,
        site_address: intake.site_address,
        billing_snapshot: intake.billing_snapshot,
        scheduled_for: intake.scheduled_for,
        created_at: now.clone(),
        updated_at: now,
    };
    job_repo::insert(db, &job)?;
    event_repo::insert(
        db,
        &JobEvent::new(
            &job.id,
            "job_created",
            serde_json::json!({
                "job_type": job.job_type.as_str(),
                "ops_status": job.ops_status.as_str(),
            }),
            actor,
        ),
    )?;

    info!(job_id = %job.id, job_type = job.job_type.as_str(), "job created");
    Ok(job)
}

/// Form-bound intake.
pub fn create_job_from_form(db: &Database, form: &FormData, actor: Option<&str>) -> Result<Job> {
    let job_type_raw = form::require(form, "job_type")?;
    let job_type = JobType::parse(&job_type_raw).ok_or(ValidationError::InvalidField {
        field: "job_type",
        value: job_type_raw,
    })?;
    let project_type_raw = form::require(form, "project_type")?;
    let project_type = ProjectType::parse(&project_type_raw).ok_or(ValidationError::InvalidField {
        field: "project_type",
        value: project_type_raw,
    })?;

    create_job(
        db,
        JobIntake {
            job_type,
            project_type,
            customer_name: form::text(form, "customer_name"),
            site_address: form::text(form, "site_address"),
            billing_snapshot: form::text(form, "billing_snapshot")
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            scheduled_for: form::text(form, "scheduled_for"),
        },
        actor,
    )
}

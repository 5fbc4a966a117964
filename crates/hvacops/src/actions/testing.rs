//! Test-run capture, completion, overrides, and exemptions.
//!
//! Data flow per submission: normalize → evaluate → persist verdict →
//! re-aggregate the whole job → status machine (unless manually locked) →
//! retest linker on a terminal transition.

use tracing::{info, info_span};

use crate::db::{event_repo, job_repo, system_repo, test_run_repo, visit_repo, Database};
use crate::error::{DomainError, Result, ValidationError};
use crate::form::{self, FormData};
use crate::lifecycle::{
    evaluate_ecc_ops_status, reconcile_parent_after_completion, set_ops_status_if_not_manual,
    JobVerdict,
};
use crate::model::{
    new_id, now_rfc3339, Job, JobEvent, OpsStatus, System, TestData, TestRun, TestType, Visit,
    VisitOutcome, VisitStatus,
};
use crate::normalize::normalize;
use crate::rules;

/// Saves one test sheet without completing the run. Partial entry is fine;
/// the verdict is recomputed from whatever readings are present.
pub fn save_test_data_from_form(
    db: &Database,
    form: &FormData,
    _actor: Option<&str>,
) -> Result<TestRun> {
    let job_id = form::require(form, "job_id")?;
    let job = find_job(db, &job_id)?;

    let system_id = form::require(form, "system_id")?;
    let system =
        system_repo::find_by_id(db, &system_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "system",
            id: system_id.clone(),
        })?;
    if system.job_id != job.id {
        return Err(DomainError::SystemJobMismatch {
            system_id: system.id,
            job_id: job.id,
        }
        .into());
    }

    let test_type_raw = form::require(form, "test_type")?;
    let test_type = TestType::parse(&test_type_raw).ok_or(ValidationError::InvalidField {
        field: "test_type",
        value: test_type_raw,
    })?;

    let _span = info_span!("save_test_data", job_id = %job.id, system = %system.name, test_type = test_type.as_str()).entered();

    let visit = anchor_visit(db, &job, form)?;

    let mut data = normalize(test_type, form);
    backfill_tonnage(db, &mut data, &system)?;

    let computed = rules::evaluate(&data, job.project_type);
    let computed_pass = computed.as_ref().and_then(|e| e.verdict.as_pass());

    let now = now_rfc3339();
    let mut run = match test_run_repo::find_for_key(db, &job.id, &visit.id, &system.id, test_type)? {
        Some(run) => run,
        None => {
            let run = TestRun {
                id: new_id(),
                job_id: job.id.clone(),
                visit_id: visit.id.clone(),
                system_id: Some(system.id.clone()),
                test_type,
                data: None,
                computed: None,
                computed_pass: None,
                override_pass: None,
                override_reason: None,
                is_completed: false,
                created_at: now.clone(),
                updated_at: now.clone(),
            };
            test_run_repo::insert(db, &run)?;
            run
        }
    };

    run.data = Some(data);
    run.computed = computed;
    run.computed_pass = computed_pass;
    run.updated_at = now;
    test_run_repo::update(db, &run)?;
    Ok(run)
}

/// Saves and completes a test run, then rolls the whole job up: aggregate
/// verdict, ops-status transition, visit outcome, retest linkage.
pub fn complete_ecc_test_run_from_form(
    db: &Database,
    form: &FormData,
    actor: Option<&str>,
) -> Result<TestRun> {
    let mut run = save_test_data_from_form(db, form, actor)?;

    // Reconcile data-less duplicates left behind by racing saves before the
    // partial unique index admits this one as the completed run.
    test_run_repo::delete_incomplete_duplicates(db, &run)?;

    run.is_completed = true;
    run.updated_at = now_rfc3339();
    test_run_repo::update(db, &run)?;
    event_repo::insert(
        db,
        &JobEvent::new(
            &run.job_id,
            "test_run_completed",
            serde_json::json!({
                "test_run_id": run.id,
                "test_type": run.test_type.as_str(),
                "system_id": run.system_id,
                "computed_pass": run.computed_pass,
            }),
            actor,
        ),
    )?;

    let mut job = find_job(db, &run.job_id)?;
    finish_completion(db, &mut job, &run, actor)?;
    Ok(run)
}

/// Sets or clears a manual override. Setting requires a reason; clearing is
/// non-sticky, returning the run to whatever the raw measurements dictate.
/// A completed run's job is re-aggregated afterwards.
pub fn set_test_run_override(
    db: &Database,
    test_run_id: &str,
    override_pass: Option<bool>,
    reason: Option<String>,
    actor: Option<&str>,
) -> Result<TestRun> {
    let mut run = find_run(db, test_run_id)?;

    if override_pass.is_some() {
        let reason = reason
            .filter(|r| !r.trim().is_empty())
            .ok_or(ValidationError::OverrideWithoutReason)?;
        run.override_pass = override_pass;
        run.override_reason = Some(reason.clone());
        event_repo::insert(
            db,
            &JobEvent::new(
                &run.job_id,
                "override_set",
                serde_json::json!({
                    "test_run_id": run.id,
                    "override_pass": override_pass,
                    "reason": reason,
                }),
                actor,
            ),
        )?;
    } else {
        run.override_pass = None;
        run.override_reason = None;
        event_repo::insert(
            db,
            &JobEvent::new(
                &run.job_id,
                "override_cleared",
                serde_json::json!({ "test_run_id": run.id }),
                actor,
            ),
        )?;
    }

    run.updated_at = now_rfc3339();
    test_run_repo::update(db, &run)?;

    if run.is_completed {
        let mut job = find_job(db, &run.job_id)?;
        finish_completion(db, &mut job, &run, actor)?;
    }
    Ok(run)
}

/// Exemption categories a technician can claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemptionKind {
    /// Package units have no field-testable split circuit.
    PackageUnit,
    /// Weather/site conditions made the test impossible.
    ConditionsNotMet,
}

impl ExemptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExemptionKind::PackageUnit => "package_unit",
            ExemptionKind::ConditionsNotMet => "conditions_not_met",
        }
    }
}

/// Applies an exemption: forces `override_pass = true` (leaving the computed
/// verdict untouched), records a structured reason, and — an exemption being
/// final — completes the run and rolls the job up.
pub fn apply_exemption(
    db: &Database,
    test_run_id: &str,
    kind: ExemptionKind,
    note: Option<&str>,
    actor: Option<&str>,
) -> Result<TestRun> {
    let mut run = find_run(db, test_run_id)?;

    let reason = match note {
        Some(note) => format!("exempt:{}: {note}", kind.as_str()),
        None => format!("exempt:{}", kind.as_str()),
    };

    test_run_repo::delete_incomplete_duplicates(db, &run)?;

    run.override_pass = Some(true);
    run.override_reason = Some(reason.clone());
    run.is_completed = true;
    run.updated_at = now_rfc3339();
    test_run_repo::update(db, &run)?;
    event_repo::insert(
        db,
        &JobEvent::new(
            &run.job_id,
            "exemption_applied",
            serde_json::json!({
                "test_run_id": run.id,
                "kind": kind.as_str(),
                "reason": reason,
            }),
            actor,
        ),
    )?;

    let mut job = find_job(db, &run.job_id)?;
    finish_completion(db, &mut job, &run, actor)?;
    Ok(run)
}

/// Explicitly deletes a test run, then cleans up its system if orphaned.
pub fn delete_test_run(db: &Database, test_run_id: &str) -> Result<()> {
    let run = find_run(db, test_run_id)?;
    test_run_repo::delete(db, &run.id)?;
    if let Some(system_id) = run.system_id.as_deref() {
        super::equipment::cleanup_orphan_system(db, system_id)?;
    }
    Ok(())
}

/// Aggregate → status machine → visit outcome → retest linker.
fn finish_completion(db: &Database, job: &mut Job, run: &TestRun, actor: Option<&str>) -> Result<()> {
    let before = job.ops_status;
    let verdict = evaluate_ecc_ops_status(db, job)?;

    match verdict {
        Some(JobVerdict::Fail) => {
            set_ops_status_if_not_manual(db, job, OpsStatus::Failed, "ecc_aggregate", actor)?;
        }
        Some(JobVerdict::Pass) => {
            set_ops_status_if_not_manual(
                db,
                job,
                OpsStatus::PaperworkRequired,
                "ecc_aggregate",
                actor,
            )?;
        }
        None => {}
    }

    if let Some(verdict) = verdict {
        if let Some(mut visit) = visit_repo::find_by_id(db, &run.visit_id)? {
            visit.status = VisitStatus::Completed;
            visit.outcome = Some(match verdict {
                JobVerdict::Pass => VisitOutcome::Pass,
                JobVerdict::Fail => VisitOutcome::Fail,
            });
            visit_repo::update(db, &visit)?;
        }
        info!(
            job_id = %job.id,
            verdict = ?verdict,
            ops_status = job.ops_status.as_str(),
            "job-level ECC verdict reached"
        );
    }

    reconcile_parent_after_completion(db, job, before, job.ops_status, actor)
}

/// Anchors the run to a visit: an explicit `visit_id` field wins, else the
/// latest visit, else an implicit first visit is created.
fn anchor_visit(db: &Database, job: &Job, form: &FormData) -> Result<Visit> {
    if let Some(visit_id) = form::text(form, "visit_id") {
        let visit =
            visit_repo::find_by_id(db, &visit_id)?.ok_or_else(|| ValidationError::NotFound {
                entity: "visit",
                id: visit_id.clone(),
            })?;
        if visit.job_id != job.id {
            return Err(ValidationError::InvalidField {
                field: "visit_id",
                value: visit_id,
            }
            .into());
        }
        return Ok(visit);
    }

    if let Some(visit) = visit_repo::latest_for_job(db, &job.id)? {
        return Ok(visit);
    }

    let visit = Visit {
        id: new_id(),
        job_id: job.id.clone(),
        visit_number: 1,
        status: if job.scheduled_for.is_some() {
            VisitStatus::Scheduled
        } else {
            VisitStatus::NeedToSchedule
        },
        outcome: None,
        needs_another_visit: false,
        scheduled_for: job.scheduled_for.clone(),
    };
    visit_repo::insert(db, &visit)?;
    Ok(visit)
}

/// For duct-leakage and airflow sheets with no tonnage entered, falls back
/// to the largest rated tonnage on the system's equipment.
fn backfill_tonnage(db: &Database, data: &mut TestData, system: &System) -> Result<()> {
    let slot = match data {
        TestData::DuctLeakage(readings) => &mut readings.tonnage,
        TestData::Airflow(readings) => &mut readings.tonnage,
        _ => return Ok(()),
    };
    if slot.is_none() {
        *slot = crate::db::equipment_repo::max_tonnage_for_system(db, &system.id)?;
    }
    Ok(())
}

fn find_job(db: &Database, job_id: &str) -> Result<Job> {
    Ok(
        job_repo::find_by_id(db, job_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "job",
            id: job_id.to_string(),
        })?,
    )
}

fn find_run(db: &Database, test_run_id: &str) -> Result<TestRun> {
    Ok(
        test_run_repo::find_by_id(db, test_run_id)?.ok_or_else(|| ValidationError::NotFound {
            entity: "test run",
            id: test_run_id.to_string(),
        })?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::equipment::add_equipment_from_form;
    use crate::actions::intake::{create_job, JobIntake};
    use crate::model::{JobType, ProjectType, Verdict};

    fn form(pairs: &[(&str, &str)]) -> FormData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ecc_job(db: &Database, project_type: ProjectType) -> Job {
        create_job(
            db,
            JobIntake {
                job_type: JobType::Ecc,
                project_type,
                customer_name: None,
                site_address: None,
                billing_snapshot: None,
                scheduled_for: Some("2026-09-02T09:00:00Z".to_string()),
            },
            None,
        )
        .unwrap()
    }

    fn upstairs(db: &Database, job: &Job, tonnage: &str) -> System {
        add_equipment_from_form(
            db,
            &form(&[
                ("job_id", &job.id),
                ("system_label", "Upstairs"),
                ("role", "outdoor"),
                ("tonnage", tonnage),
            ]),
            None,
        )
        .unwrap();
        system_repo::find_by_name(db, &job.id, "Upstairs")
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_save_evaluates_and_persists() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        let run = save_test_data_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "duct_leakage"),
                ("leakage_cfm", "150"),
                ("tonnage", "3"),
            ]),
            None,
        )
        .unwrap();

        // 150 > 3 × 40: fail.
        assert_eq!(run.computed_pass, Some(false));
        assert!(!run.is_completed);
        assert_eq!(run.computed.as_ref().unwrap().verdict, Verdict::Fail);

        // An implicit anchor visit was created.
        let visits = visit_repo::find_by_job(&db, &job.id).unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].visit_number, 1);
    }

    #[test]
    fn test_save_backfills_tonnage_from_equipment() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        let run = save_test_data_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "airflow"),
                ("total_airflow_cfm", "1000"),
            ]),
            None,
        )
        .unwrap();

        // 1000 ≥ 3 × 300 with tonnage pulled off the outdoor unit.
        assert_eq!(run.computed_pass, Some(true));
    }

    #[test]
    fn test_resave_updates_same_run() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        let base = form(&[
            ("job_id", &job.id),
            ("system_id", &system.id),
            ("test_type", "duct_leakage"),
            ("leakage_cfm", "150"),
        ]);
        let first = save_test_data_from_form(&db, &base, None).unwrap();

        let mut better = base.clone();
        better.insert("leakage_cfm".to_string(), "90".to_string());
        let second = save_test_data_from_form(&db, &better, None).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.computed_pass, Some(true));
        assert_eq!(test_run_repo::find_by_job(&db, &job.id).unwrap().len(), 1);
    }

    #[test]
    fn test_complete_fail_transitions_job() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        complete_ecc_test_run_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "duct_leakage"),
                ("leakage_cfm", "500"),
            ]),
            None,
        )
        .unwrap();

        let job = job_repo::find_by_id(&db, &job.id).unwrap().unwrap();
        assert_eq!(job.ops_status, OpsStatus::Failed);

        // Visit outcome recorded.
        let visits = visit_repo::find_by_job(&db, &job.id).unwrap();
        assert_eq!(visits[0].outcome, Some(VisitOutcome::Fail));
        assert_eq!(visits[0].status, VisitStatus::Completed);
    }

    fn complete_passing_suite(db: &Database, job: &Job, system: &System) {
        complete_ecc_test_run_from_form(
            db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "duct_leakage"),
                ("leakage_cfm", "80"),
            ]),
            None,
        )
        .unwrap();
        complete_ecc_test_run_from_form(
            db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "airflow"),
                ("total_airflow_cfm", "1000"),
            ]),
            None,
        )
        .unwrap();
        complete_ecc_test_run_from_form(
            db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "refrigerant_charge"),
                ("condenser_sat_f", "105"),
                ("liquid_line_f", "95"),
                ("suction_line_f", "55"),
                ("evaporator_sat_f", "40"),
                ("target_subcool_f", "10"),
                ("lowest_return_db_f", "75"),
                ("outdoor_temp_f", "85"),
                ("filter_drier_installed", "yes"),
            ]),
            None,
        )
        .unwrap();
    }

    #[test]
    fn test_full_passing_suite_reaches_paperwork() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        complete_passing_suite(&db, &job, &system);

        let job = job_repo::find_by_id(&db, &job.id).unwrap().unwrap();
        assert_eq!(job.ops_status, OpsStatus::PaperworkRequired);
    }

    #[test]
    fn test_manual_lock_survives_completion() {
        let db = Database::open_in_memory().unwrap();
        let mut job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");
        crate::lifecycle::force_set_ops_status(&db, &mut job, OpsStatus::PendingInfo, "test", None)
            .unwrap();

        complete_ecc_test_run_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "duct_leakage"),
                ("leakage_cfm", "500"),
            ]),
            None,
        )
        .unwrap();

        let job = job_repo::find_by_id(&db, &job.id).unwrap().unwrap();
        assert_eq!(job.ops_status, OpsStatus::PendingInfo);
    }

    #[test]
    fn test_override_round_trip_is_non_sticky() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        let run = save_test_data_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "duct_leakage"),
                ("leakage_cfm", "500"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(run.effective_pass(), Some(false));

        let run = set_test_run_override(
            &db,
            &run.id,
            Some(true),
            Some("hand-verified at register".to_string()),
            None,
        )
        .unwrap();
        assert_eq!(run.effective_pass(), Some(true));

        let run = set_test_run_override(&db, &run.id, None, None, None).unwrap();
        assert_eq!(run.effective_pass(), Some(false));
        assert!(run.override_reason.is_none());
    }

    #[test]
    fn test_override_requires_reason() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        let run = save_test_data_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "airflow"),
            ]),
            None,
        )
        .unwrap();

        let err = set_test_run_override(&db, &run.id, Some(true), Some("  ".to_string()), None)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::HvacopsError::Validation(ValidationError::OverrideWithoutReason)
        ));
    }

    #[test]
    fn test_exemption_completes_and_keeps_computed() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);
        let system = upstairs(&db, &job, "3");

        // Failing refrigerant sheet.
        let run = save_test_data_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "refrigerant_charge"),
                ("condenser_sat_f", "105"),
                ("liquid_line_f", "95"),
                ("suction_line_f", "70"),
                ("evaporator_sat_f", "40"),
                ("target_subcool_f", "10"),
                ("lowest_return_db_f", "75"),
                ("outdoor_temp_f", "85"),
                ("filter_drier_installed", "yes"),
            ]),
            None,
        )
        .unwrap();
        assert_eq!(run.computed_pass, Some(false));

        let run = apply_exemption(
            &db,
            &run.id,
            ExemptionKind::PackageUnit,
            Some("rooftop package unit"),
            None,
        )
        .unwrap();

        assert!(run.is_completed);
        assert_eq!(run.override_pass, Some(true));
        // Computed verdict stays on record.
        assert_eq!(run.computed_pass, Some(false));
        assert_eq!(
            run.override_reason.as_deref(),
            Some("exempt:package_unit: rooftop package unit")
        );
    }

    #[test]
    fn test_delete_run_cleans_up_orphan_system() {
        let db = Database::open_in_memory().unwrap();
        let job = ecc_job(&db, ProjectType::Alteration);

        // System with a run but no equipment.
        let system = System {
            id: new_id(),
            job_id: job.id.clone(),
            name: "Attic".to_string(),
        };
        system_repo::insert(&db, &system).unwrap();
        let run = save_test_data_from_form(
            &db,
            &form(&[
                ("job_id", &job.id),
                ("system_id", &system.id),
                ("test_type", "airflow"),
            ]),
            None,
        )
        .unwrap();

        delete_test_run(&db, &run.id).unwrap();
        assert!(system_repo::find_by_id(&db, &system.id).unwrap().is_none());
    }

    #[test]
    fn test_system_from_other_job_rejected() {
        let db = Database::open_in_memory().unwrap();
        let job_a = ecc_job(&db, ProjectType::Alteration);
        let job_b = ecc_job(&db, ProjectType::Alteration);
        let system_b = upstairs(&db, &job_b, "3");

        let err = save_test_data_from_form(
            &db,
            &form(&[
                ("job_id", &job_a.id),
                ("system_id", &system_b.id),
                ("test_type", "airflow"),
            ]),
            None,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::HvacopsError::Domain(DomainError::SystemJobMismatch { .. })
        ));
    }
}

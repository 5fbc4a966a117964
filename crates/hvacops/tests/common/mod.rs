//! Shared helpers for hvacops integration tests: an in-memory database
//! plus form builders for the submission-driven actions.

use hvacops::actions::{add_equipment_from_form, complete_ecc_test_run_from_form, create_job};
use hvacops::db::system_repo;
use hvacops::{Database, Job, JobIntake, JobType, ProjectType, System};
use std::collections::HashMap;

pub fn db() -> Database {
    Database::open_in_memory().unwrap()
}

pub fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn ecc_job(db: &Database, project_type: ProjectType) -> Job {
    create_job(
        db,
        JobIntake {
            job_type: JobType::Ecc,
            project_type,
            customer_name: Some("Acme Homes".to_string()),
            site_address: Some("12 Elm St".to_string()),
            billing_snapshot: None,
            scheduled_for: Some("2026-09-02T09:00:00Z".to_string()),
        },
        None,
    )
    .unwrap()
}

/// Registers a 3-ton outdoor unit under the named system and returns it.
pub fn system_with_condenser(db: &Database, job: &Job, name: &str) -> System {
    add_equipment_from_form(
        db,
        &form(&[
            ("job_id", &job.id),
            ("system_label", name),
            ("role", "outdoor"),
            ("tonnage", "3"),
        ]),
        None,
    )
    .unwrap();
    system_repo::find_by_name(db, &job.id, name).unwrap().unwrap()
}

/// Completes the full required-test suite for one system with readings that
/// pass under any project type.
pub fn complete_passing_suite(db: &Database, job: &Job, system: &System) {
    complete_ecc_test_run_from_form(
        db,
        &form(&[
            ("job_id", &job.id),
            ("system_id", &system.id),
            ("test_type", "duct_leakage"),
            ("leakage_cfm", "50"),
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
            ("total_airflow_cfm", "1100"),
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

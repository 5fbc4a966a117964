pub mod actions;
pub mod config;
pub mod db;
pub mod error;
pub mod form;
pub mod lifecycle;
pub mod model;
pub mod normalize;
pub mod rules;
pub mod telemetry;

pub use actions::{
    add_equipment_from_form, apply_exemption, complete_ecc_test_run_from_form, create_job,
    create_job_from_form, create_retest_from_form, delete_test_run, log_contact_attempt,
    mark_invoice_sent, mark_service_complete, remove_equipment, save_test_data_from_form,
    schedule_job, set_ops_status_manual, set_test_run_override, ExemptionKind, JobIntake,
};
pub use config::{load_config, Config};
pub use db::Database;
pub use error::{ConfigError, DomainError, HvacopsError, Result, ValidationError};
pub use lifecycle::{create_retest, evaluate_ecc_ops_status, JobVerdict, REQUIRED_TESTS};
pub use model::{
    Job, JobType, OpsStatus, ProjectType, System, TestData, TestRun, TestType, Verdict, Visit,
};
pub use normalize::normalize;
pub use telemetry::init_tracing;

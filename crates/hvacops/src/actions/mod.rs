//! Form-submission handlers.
//!
//! Each function is one request-scoped action: parse the form, validate,
//! mutate, record timeline events. The host threads an explicit `Database`
//! handle in; there is no process-wide state.

pub mod equipment;
pub mod intake;
pub mod ops;
pub mod schedule;
pub mod service;
pub mod testing;

pub use equipment::{add_equipment_from_form, remove_equipment};
pub use intake::{create_job, create_job_from_form, JobIntake};
pub use ops::{create_retest_from_form, log_contact_attempt, set_ops_status_manual};
pub use schedule::{request_another_visit, schedule_job};
pub use service::{mark_invoice_sent, mark_service_complete};
pub use testing::{
    apply_exemption, complete_ecc_test_run_from_form, delete_test_run, save_test_data_from_form,
    set_test_run_override, ExemptionKind,
};

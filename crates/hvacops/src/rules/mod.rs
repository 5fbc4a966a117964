//! Compliance Rule Evaluator.
//!
//! Pure verdict computation over normalized readings. The numeric thresholds
//! are fixed energy-code constants, not configuration.

mod airflow;
mod duct_leakage;
mod refrigerant;

pub use airflow::evaluate_airflow;
pub use duct_leakage::evaluate_duct_leakage;
pub use refrigerant::evaluate_refrigerant_charge;

use crate::model::{Evaluation, ProjectType, TestData};

/// Allowed duct leakage per ton of cooling, CFM.
pub const DUCT_LEAKAGE_CFM_PER_TON_ALL_NEW: f64 = 20.0;
pub const DUCT_LEAKAGE_CFM_PER_TON_EXISTING: f64 = 40.0;

/// Required delivered airflow per ton of cooling, CFM.
pub const AIRFLOW_CFM_PER_TON_ALL_NEW: f64 = 350.0;
pub const AIRFLOW_CFM_PER_TON_EXISTING: f64 = 300.0;

/// Refrigerant-charge test gating: below either temperature the charge test
/// cannot be run at all.
pub const MIN_RETURN_AIR_DB_F: f64 = 70.0;
pub const MIN_OUTDOOR_TEMP_F: f64 = 55.0;

/// Refrigerant-charge failure thresholds.
pub const SUBCOOL_TOLERANCE_F: f64 = 2.0;
pub const MAX_SUPERHEAT_F: f64 = 25.0;

/// Evaluates one test run's readings. Returns `None` for custom tests, which
/// carry no automatic verdict.
pub fn evaluate(data: &TestData, project_type: ProjectType) -> Option<Evaluation> {
    match data {
        TestData::DuctLeakage(readings) => Some(evaluate_duct_leakage(readings, project_type)),
        TestData::Airflow(readings) => Some(evaluate_airflow(readings, project_type)),
        TestData::RefrigerantCharge(readings) => Some(evaluate_refrigerant_charge(readings)),
        TestData::Custom(_) => None,
    }
}

/// Per-ton duct-leakage limit for the project type.
pub(crate) fn duct_leakage_cfm_per_ton(project_type: ProjectType) -> f64 {
    match project_type {
        ProjectType::AllNew => DUCT_LEAKAGE_CFM_PER_TON_ALL_NEW,
        _ => DUCT_LEAKAGE_CFM_PER_TON_EXISTING,
    }
}

/// Per-ton airflow requirement for the project type.
pub(crate) fn airflow_cfm_per_ton(project_type: ProjectType) -> f64 {
    match project_type {
        ProjectType::AllNew => AIRFLOW_CFM_PER_TON_ALL_NEW,
        _ => AIRFLOW_CFM_PER_TON_EXISTING,
    }
}

//! Per-System Aggregator.
//!
//! Rolls all test runs on an ECC job up into a single job-level verdict.
//! The matrix math is pure; `evaluate_ecc_ops_status` is the db-backed shell.

use std::collections::HashMap;

use crate::db::{system_repo, test_run_repo, Database};
use crate::error::Result;
use crate::model::{Job, System, TestRun, TestType};

/// Every ECC job requires all three tests on every declared system, for all
/// project types. The numeric thresholds vary by project type but the
/// required set does not; that asymmetry is deliberate and preserved.
pub const REQUIRED_TESTS: [TestType; 3] = [
    TestType::DuctLeakage,
    TestType::Airflow,
    TestType::RefrigerantCharge,
];

/// Rollup for one {system × test type} cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct TestCell {
    pub has_completed: bool,
    pub any_fail: bool,
    pub any_pass: bool,
}

/// The full {system × required test} rollup for a job.
#[derive(Debug, Default)]
pub struct SystemMatrix {
    cells: HashMap<(String, TestType), TestCell>,
}

impl SystemMatrix {
    pub fn cell(&self, system_id: &str, test_type: TestType) -> TestCell {
        self.cells
            .get(&(system_id.to_string(), test_type))
            .copied()
            .unwrap_or_default()
    }
}

/// Job-level rollup verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobVerdict {
    Pass,
    Fail,
}

/// Builds the rollup matrix from a job's declared systems and test runs.
/// Runs without a system, or anchored to an undeclared system, are ignored
/// (legacy-data exclusion).
pub fn build_matrix(systems: &[System], runs: &[TestRun]) -> SystemMatrix {
    let mut matrix = SystemMatrix::default();

    for run in runs {
        let Some(system_id) = run.system_id.as_deref() else {
            continue;
        };
        if !systems.iter().any(|s| s.id == system_id) {
            continue;
        }
        if !REQUIRED_TESTS.contains(&run.test_type) {
            continue;
        }

        let cell = matrix
            .cells
            .entry((system_id.to_string(), run.test_type))
            .or_default();
        if run.is_completed {
            cell.has_completed = true;
        }
        match run.effective_pass() {
            Some(true) => cell.any_pass = true,
            Some(false) => cell.any_fail = true,
            None => {}
        }
    }

    matrix
}

/// Decision rule, in precedence order: any failure anywhere dominates; a full
/// pass requires every declared system to have every required test completed
/// with at least one pass; anything else yields no verdict. A job with zero
/// declared systems never passes.
pub fn decide(systems: &[System], matrix: &SystemMatrix) -> Option<JobVerdict> {
    let mut all_complete_and_passing = !systems.is_empty();

    for system in systems {
        for test_type in REQUIRED_TESTS {
            let cell = matrix.cell(&system.id, test_type);
            if cell.any_fail {
                return Some(JobVerdict::Fail);
            }
            if !(cell.has_completed && cell.any_pass) {
                all_complete_and_passing = false;
            }
        }
    }

    if all_complete_and_passing {
        Some(JobVerdict::Pass)
    } else {
        None
    }
}

/// Loads a job's systems and runs and rolls them up.
pub fn evaluate_ecc_ops_status(db: &Database, job: &Job) -> Result<Option<JobVerdict>> {
    let systems = system_repo::find_by_job(db, &job.id)?;
    let runs = test_run_repo::find_by_job(db, &job.id)?;
    Ok(decide(&systems, &build_matrix(&systems, &runs)))
}

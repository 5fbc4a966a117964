//! Job lifecycle engine: ops-status transitions, per-system aggregation,
//! and retest linking.

pub mod aggregate;
pub mod retest;
pub mod status;

pub use aggregate::{evaluate_ecc_ops_status, JobVerdict, REQUIRED_TESTS};
pub use retest::{create_retest, reconcile_parent_after_completion};
pub use status::{force_set_ops_status, initial_ops_status, set_ops_status_if_not_manual};

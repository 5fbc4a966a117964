//! Typed domain records shared by the rule evaluator, lifecycle engine,
//! persistence layer, and action handlers.

pub mod event;
pub mod job;
pub mod system;
pub mod test_run;
pub mod visit;

pub use event::JobEvent;
pub use job::{Job, JobType, OpsStatus, ProjectType};
pub use system::{Equipment, EquipmentRole, System};
pub use test_run::{
    AirflowReadings, CustomReadings, DuctLeakageReadings, Evaluation, RefrigerantReadings,
    TestData, TestRun, TestType, Verdict,
};
pub use visit::{Visit, VisitOutcome, VisitStatus};

use chrono::{SecondsFormat, Utc};

/// Current UTC time as an RFC3339 string, the timestamp format every table
/// stores.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Fresh v4 UUID string, the id format every table uses.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

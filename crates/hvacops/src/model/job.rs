use serde::{Deserialize, Serialize};

/// The two kinds of work the shop takes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Energy-code compliance test job (duct leakage, airflow, refrigerant).
    Ecc,
    /// Plain service call with no compliance testing.
    Service,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Ecc => "ecc",
            JobType::Service => "service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ecc" => Some(JobType::Ecc),
            "service" => Some(JobType::Service),
            _ => None,
        }
    }
}

/// Permit/project classification. `AllNew` carries tighter duct-leakage and
/// airflow thresholds than the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Alteration,
    AllNew,
    NewConstruction,
    Service,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::Alteration => "alteration",
            ProjectType::AllNew => "all_new",
            ProjectType::NewConstruction => "new_construction",
            ProjectType::Service => "service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "alteration" => Some(ProjectType::Alteration),
            "all_new" => Some(ProjectType::AllNew),
            "new_construction" => Some(ProjectType::NewConstruction),
            "service" => Some(ProjectType::Service),
            _ => None,
        }
    }
}

/// The operational queue a job sits in for staff triage, independent of raw
/// test verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpsStatus {
    NeedToSchedule,
    Scheduled,
    PendingInfo,
    OnHold,
    Failed,
    RetestNeeded,
    PaperworkRequired,
    InvoiceRequired,
    Closed,
}

impl OpsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpsStatus::NeedToSchedule => "need_to_schedule",
            OpsStatus::Scheduled => "scheduled",
            OpsStatus::PendingInfo => "pending_info",
            OpsStatus::OnHold => "on_hold",
            OpsStatus::Failed => "failed",
            OpsStatus::RetestNeeded => "retest_needed",
            OpsStatus::PaperworkRequired => "paperwork_required",
            OpsStatus::InvoiceRequired => "invoice_required",
            OpsStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "need_to_schedule" => Some(OpsStatus::NeedToSchedule),
            "scheduled" => Some(OpsStatus::Scheduled),
            "pending_info" => Some(OpsStatus::PendingInfo),
            "on_hold" => Some(OpsStatus::OnHold),
            "failed" => Some(OpsStatus::Failed),
            "retest_needed" => Some(OpsStatus::RetestNeeded),
            "paperwork_required" => Some(OpsStatus::PaperworkRequired),
            "invoice_required" => Some(OpsStatus::InvoiceRequired),
            "closed" => Some(OpsStatus::Closed),
            _ => None,
        }
    }

    /// A manually-locked status blocks automatic overwrites until a human
    /// explicitly changes it.
    pub fn is_manual_lock(&self) -> bool {
        matches!(
            self,
            OpsStatus::PendingInfo
                | OpsStatus::OnHold
                | OpsStatus::RetestNeeded
                | OpsStatus::PaperworkRequired
                | OpsStatus::InvoiceRequired
        )
    }
}

/// One unit of work: an ECC test job or a service job. Never hard-deleted;
/// retired via `ops_status`.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub job_type: JobType,
    pub project_type: ProjectType,
    pub ops_status: OpsStatus,
    /// Set on retest jobs; points at the failed job this one re-attempts.
    pub parent_job_id: Option<String>,
    pub customer_name: Option<String>,
    pub site_address: Option<String>,
    /// Billing terms captured at intake, carried verbatim onto retests.
    pub billing_snapshot: Option<serde_json::Value>,
    pub scheduled_for: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

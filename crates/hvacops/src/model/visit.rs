use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    NeedToSchedule,
    Scheduled,
    Completed,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::NeedToSchedule => "need_to_schedule",
            VisitStatus::Scheduled => "scheduled",
            VisitStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "need_to_schedule" => Some(VisitStatus::NeedToSchedule),
            "scheduled" => Some(VisitStatus::Scheduled),
            "completed" => Some(VisitStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitOutcome {
    Pass,
    Fail,
}

impl VisitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitOutcome::Pass => "pass",
            VisitOutcome::Fail => "fail",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pass" => Some(VisitOutcome::Pass),
            "fail" => Some(VisitOutcome::Fail),
            _ => None,
        }
    }
}

/// One numbered on-site attendance for a job. Created implicitly as the
/// anchor for the first test run, or explicitly by scheduling.
#[derive(Debug, Clone)]
pub struct Visit {
    pub id: String,
    pub job_id: String,
    pub visit_number: i64,
    pub status: VisitStatus,
    pub outcome: Option<VisitOutcome>,
    pub needs_another_visit: bool,
    pub scheduled_for: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visit_status_round_trip() {
        for status in [
            VisitStatus::NeedToSchedule,
            VisitStatus::Scheduled,
            VisitStatus::Completed,
        ] {
            assert_eq!(VisitStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_visit_outcome_parse() {
        assert_eq!(VisitOutcome::parse("pass"), Some(VisitOutcome::Pass));
        assert_eq!(VisitOutcome::parse("fail"), Some(VisitOutcome::Fail));
        assert_eq!(VisitOutcome::parse("maybe"), None);
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    DuctLeakage,
    Airflow,
    RefrigerantCharge,
    Custom,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::DuctLeakage => "duct_leakage",
            TestType::Airflow => "airflow",
            TestType::RefrigerantCharge => "refrigerant_charge",
            TestType::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "duct_leakage" => Some(TestType::DuctLeakage),
            "airflow" => Some(TestType::Airflow),
            "refrigerant_charge" => Some(TestType::RefrigerantCharge),
            "custom" => Some(TestType::Custom),
            _ => None,
        }
    }
}

/// Computed result of one evaluation. `Blocked` means site conditions did not
/// permit the test at all (a hard domain policy, not a measurement failure);
/// `Unknown` means required readings were missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    Blocked,
    Unknown,
}

impl Verdict {
    /// Collapses to the nullable boolean the aggregate math runs on:
    /// Pass → true, Fail → false, Blocked/Unknown → null.
    pub fn as_pass(&self) -> Option<bool> {
        match self {
            Verdict::Pass => Some(true),
            Verdict::Fail => Some(false),
            Verdict::Blocked | Verdict::Unknown => None,
        }
    }
}

/// Verdict plus the operator-facing reasons behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
}

impl Evaluation {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            failures: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Normalized duct-leakage readings. Blank form fields arrive as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuctLeakageReadings {
    pub leakage_cfm: Option<f64>,
    pub tonnage: Option<f64>,
    pub notes: Option<String>,
}

/// Normalized airflow readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirflowReadings {
    pub total_airflow_cfm: Option<f64>,
    pub tonnage: Option<f64>,
    pub notes: Option<String>,
}

/// Normalized refrigerant-charge readings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefrigerantReadings {
    pub condenser_sat_f: Option<f64>,
    pub liquid_line_f: Option<f64>,
    pub suction_line_f: Option<f64>,
    pub evaporator_sat_f: Option<f64>,
    pub target_subcool_f: Option<f64>,
    pub lowest_return_db_f: Option<f64>,
    pub outdoor_temp_f: Option<f64>,
    pub filter_drier_installed: Option<bool>,
    pub notes: Option<String>,
}

impl RefrigerantReadings {
    /// Subcool = condenser saturation temp − liquid line temp.
    pub fn measured_subcool(&self) -> Option<f64> {
        Some(self.condenser_sat_f? - self.liquid_line_f?)
    }

    /// Superheat = suction line temp − evaporator saturation temp.
    pub fn measured_superheat(&self) -> Option<f64> {
        Some(self.suction_line_f? - self.evaporator_sat_f?)
    }
}

/// Freeform readings for a technician-defined test; never auto-evaluated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomReadings {
    pub label: Option<String>,
    pub result: Option<String>,
    pub notes: Option<String>,
}

/// Typed per-test payload stored in the `data` column. Internally tagged so
/// the JSON is self-describing when read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "test_type", rename_all = "snake_case")]
pub enum TestData {
    DuctLeakage(DuctLeakageReadings),
    Airflow(AirflowReadings),
    RefrigerantCharge(RefrigerantReadings),
    Custom(CustomReadings),
}

impl TestData {
    pub fn test_type(&self) -> TestType {
        match self {
            TestData::DuctLeakage(_) => TestType::DuctLeakage,
            TestData::Airflow(_) => TestType::Airflow,
            TestData::RefrigerantCharge(_) => TestType::RefrigerantCharge,
            TestData::Custom(_) => TestType::Custom,
        }
    }
}

/// One evaluation instance of a test type against a system, within a visit.
#[derive(Debug, Clone)]
pub struct TestRun {
    pub id: String,
    pub job_id: String,
    pub visit_id: String,
    /// Runs without a system exist in legacy data; the aggregator ignores them.
    pub system_id: Option<String>,
    pub test_type: TestType,
    pub data: Option<TestData>,
    pub computed: Option<Evaluation>,
    pub computed_pass: Option<bool>,
    /// Manual verdict; always supersedes `computed_pass` downstream.
    pub override_pass: Option<bool>,
    pub override_reason: Option<String>,
    pub is_completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TestRun {
    /// The verdict downstream aggregation runs on: the override when set,
    /// else the computed verdict.
    pub fn effective_pass(&self) -> Option<bool> {
        self.override_pass.or(self.computed_pass)
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some() || self.computed.is_some()
    }
}

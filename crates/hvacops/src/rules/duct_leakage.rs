use crate::model::{DuctLeakageReadings, Evaluation, ProjectType, Verdict};

/// Duct-leakage rule: allowed leakage = tonnage × per-ton limit (20 CFM/ton
/// for all-new projects, 40 otherwise). Fails when measured leakage exceeds
/// the limit; unknown when tonnage or the measurement is missing.
pub fn evaluate_duct_leakage(
    readings: &DuctLeakageReadings,
    project_type: ProjectType,
) -> Evaluation {
    let mut eval = Evaluation::new(Verdict::Unknown);

    let (tonnage, leakage) = match (readings.tonnage, readings.leakage_cfm) {
        (Some(t), Some(l)) => (t, l),
        (tonnage, leakage) => {
            if tonnage.is_none() {
                eval.warnings.push("Tonnage not recorded".to_string());
            }
            if leakage.is_none() {
                eval.warnings
                    .push("Measured leakage not recorded".to_string());
            }
            return eval;
        }
    };

    let limit = tonnage * super::duct_leakage_cfm_per_ton(project_type);
    if leakage > limit {
        eval.verdict = Verdict::Fail;
        eval.failures.push(format!(
            "Measured leakage {leakage:.1} CFM exceeds limit {limit:.1} CFM"
        ));
    } else {
        eval.verdict = Verdict::Pass;
    }
    eval
}

use crate::model::{AirflowReadings, Evaluation, ProjectType, Verdict};

/// Airflow rule: required delivery = tonnage × per-ton requirement
/// (350 CFM/ton for all-new projects, 300 otherwise). Fails when measured
/// total airflow falls short; unknown when inputs are missing.
pub fn evaluate_airflow(readings: &AirflowReadings, project_type: ProjectType) -> Evaluation {
    let mut eval = Evaluation::new(Verdict::Unknown);

    let (tonnage, airflow) = match (readings.tonnage, readings.total_airflow_cfm) {
        (Some(t), Some(a)) => (t, a),
        (tonnage, airflow) => {
            if tonnage.is_none() {
                eval.warnings.push("Tonnage not recorded".to_string());
            }
            if airflow.is_none() {
                eval.warnings
                    .push("Total airflow not recorded".to_string());
            }
            return eval;
        }
    };

    let required = tonnage * super::airflow_cfm_per_ton(project_type);
    if airflow < required {
        eval.verdict = Verdict::Fail;
        eval.failures.push(format!(
            "Measured airflow {airflow:.0} CFM below required {required:.0} CFM"
        ));
    } else {
        eval.verdict = Verdict::Pass;
    }
    eval
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings(tonnage: Option<f64>, airflow: Option<f64>) -> AirflowReadings {
        AirflowReadings {
            total_airflow_cfm: airflow,
            tonnage,
            notes: None,
        }
    }

    #[test]
    fn test_pass_at_requirement() {
        // 3 tons × 300 CFM/ton = 900 CFM required.
        let eval = evaluate_airflow(&readings(Some(3.0), Some(900.0)), ProjectType::Alteration);
        assert_eq!(eval.verdict, Verdict::Pass);
    }

    #[test]
    fn test_fail_below_requirement() {
        let eval = evaluate_airflow(&readings(Some(3.0), Some(899.9)), ProjectType::Alteration);
        assert_eq!(eval.verdict, Verdict::Fail);
        assert_eq!(eval.failures.len(), 1);
    }

    #[test]
    fn test_all_new_requires_more() {
        // 3 tons × 350 CFM/ton = 1050 CFM required for all-new.
        let eval = evaluate_airflow(&readings(Some(3.0), Some(1000.0)), ProjectType::AllNew);
        assert_eq!(eval.verdict, Verdict::Fail);

        let eval = evaluate_airflow(&readings(Some(3.0), Some(1050.0)), ProjectType::AllNew);
        assert_eq!(eval.verdict, Verdict::Pass);
    }

    #[test]
    fn test_missing_inputs_are_unknown() {
        let eval = evaluate_airflow(&readings(None, None), ProjectType::Alteration);
        assert_eq!(eval.verdict, Verdict::Unknown);
        assert_eq!(eval.warnings.len(), 2);

        let eval = evaluate_airflow(&readings(Some(3.0), None), ProjectType::Alteration);
        assert_eq!(eval.verdict, Verdict::Unknown);
        assert_eq!(eval.warnings, vec!["Total airflow not recorded"]);
    }
}

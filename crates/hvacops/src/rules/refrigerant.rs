use crate::model::{Evaluation, RefrigerantReadings, Verdict};

use super::{MAX_SUPERHEAT_F, MIN_OUTDOOR_TEMP_F, MIN_RETURN_AIR_DB_F, SUBCOOL_TOLERANCE_F};

/// Refrigerant-charge rule.
///
/// Gating comes first: if the lowest return-air dry-bulb is below 70 °F or
/// the outdoor temperature is below 55 °F, the test cannot be run and the
/// verdict is `Blocked` regardless of every other reading. When not blocked,
/// any of the following fails the run: filter drier not confirmed installed,
/// superheat at or above 25 °F, subcool more than 2 °F off target. Pass
/// requires all core measurements present and no failure; otherwise the
/// verdict stays `Unknown`.
pub fn evaluate_refrigerant_charge(readings: &RefrigerantReadings) -> Evaluation {
    let mut eval = Evaluation::new(Verdict::Unknown);

    // Condition gate. 70.0 °F exactly is testable; only strictly-below blocks.
    let mut blocked = false;
    if let Some(return_db) = readings.lowest_return_db_f {
        if return_db < MIN_RETURN_AIR_DB_F {
            blocked = true;
            eval.warnings.push(format!(
                "Conditions not met: lowest return-air dry-bulb {return_db:.1} °F below {MIN_RETURN_AIR_DB_F:.0} °F"
            ));
        }
    }
    if let Some(outdoor) = readings.outdoor_temp_f {
        if outdoor < MIN_OUTDOOR_TEMP_F {
            blocked = true;
            eval.warnings.push(format!(
                "Conditions not met: outdoor temperature {outdoor:.1} °F below {MIN_OUTDOOR_TEMP_F:.0} °F"
            ));
        }
    }
    if blocked {
        eval.verdict = Verdict::Blocked;
        return eval;
    }

    if readings.filter_drier_installed != Some(true) {
        eval.failures
            .push("Filter drier not confirmed installed".to_string());
    }

    let superheat = readings.measured_superheat();
    if let Some(sh) = superheat {
        if sh >= MAX_SUPERHEAT_F {
            eval.failures.push(format!(
                "Superheat {sh:.1} °F at or above {MAX_SUPERHEAT_F:.0} °F"
            ));
        }
    }

    let subcool = readings.measured_subcool();
    if let (Some(sc), Some(target)) = (subcool, readings.target_subcool_f) {
        let delta = (sc - target).abs();
        if delta > SUBCOOL_TOLERANCE_F {
            eval.failures.push(format!(
                "Subcool {sc:.1} °F is {delta:.1} °F off target {target:.1} °F (tolerance {SUBCOOL_TOLERANCE_F:.0} °F)"
            ));
        }
    }

    if !eval.failures.is_empty() {
        eval.verdict = Verdict::Fail;
        return eval;
    }

    // Pass needs the full core sheet: derivable subcool and superheat, a
    // target, and both gate temperatures confirmed testable.
    let core_complete = subcool.is_some() && superheat.is_some() && readings.target_subcool_f.is_some();
    if readings.lowest_return_db_f.is_none() {
        eval.warnings
            .push("Lowest return-air dry-bulb not recorded".to_string());
    }
    if readings.outdoor_temp_f.is_none() {
        eval.warnings
            .push("Outdoor temperature not recorded".to_string());
    }

    if core_complete && readings.lowest_return_db_f.is_some() && readings.outdoor_temp_f.is_some() {
        eval.verdict = Verdict::Pass;
    }
    eval
}

//! Measurement Normalizer.
//!
//! Turns a raw form post into the typed readings for one test type. Pure
//! transformation, no side effects; every field that is blank or unparsable
//! normalizes to `None` so partial entry is always persistable.

use crate::form::{self, FormData};
use crate::model::{
    AirflowReadings, CustomReadings, DuctLeakageReadings, RefrigerantReadings, TestData, TestType,
};

pub fn normalize(test_type: TestType, form: &FormData) -> TestData {
    match test_type {
        TestType::DuctLeakage => TestData::DuctLeakage(DuctLeakageReadings {
            leakage_cfm: form::number(form, "leakage_cfm"),
            tonnage: form::number(form, "tonnage"),
            notes: form::text(form, "notes"),
        }),
        TestType::Airflow => TestData::Airflow(AirflowReadings {
            total_airflow_cfm: form::number(form, "total_airflow_cfm"),
            tonnage: form::number(form, "tonnage"),
            notes: form::text(form, "notes"),
        }),
        TestType::RefrigerantCharge => TestData::RefrigerantCharge(RefrigerantReadings {
            condenser_sat_f: form::number(form, "condenser_sat_f"),
            liquid_line_f: form::number(form, "liquid_line_f"),
            suction_line_f: form::number(form, "suction_line_f"),
            evaporator_sat_f: form::number(form, "evaporator_sat_f"),
            target_subcool_f: form::number(form, "target_subcool_f"),
            lowest_return_db_f: form::number(form, "lowest_return_db_f"),
            outdoor_temp_f: form::number(form, "outdoor_temp_f"),
            filter_drier_installed: form::flag(form, "filter_drier_installed"),
            notes: form::text(form, "notes"),
        }),
        TestType::Custom => TestData::Custom(CustomReadings {
            label: form::text(form, "label"),
            result: form::text(form, "result"),
            notes: form::text(form, "notes"),
        }),
    }
}

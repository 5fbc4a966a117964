use serde::{Deserialize, Serialize};

/// A named equipment location/zone on a job site (e.g. "Upstairs").
/// Uniquely named within its job; removed automatically once it holds no
/// equipment and no test runs.
#[derive(Debug, Clone)]
pub struct System {
    pub id: String,
    pub job_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentRole {
    Outdoor,
    Indoor,
    Furnace,
    AirHandler,
    Other,
}

impl EquipmentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentRole::Outdoor => "outdoor",
            EquipmentRole::Indoor => "indoor",
            EquipmentRole::Furnace => "furnace",
            EquipmentRole::AirHandler => "air_handler",
            EquipmentRole::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "outdoor" => Some(EquipmentRole::Outdoor),
            "indoor" => Some(EquipmentRole::Indoor),
            "furnace" => Some(EquipmentRole::Furnace),
            "air_handler" => Some(EquipmentRole::AirHandler),
            "other" => Some(EquipmentRole::Other),
            _ => None,
        }
    }
}

/// An installed unit owned exclusively by its system.
#[derive(Debug, Clone)]
pub struct Equipment {
    pub id: String,
    pub system_id: String,
    pub role: EquipmentRole,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub tonnage: Option<f64>,
    pub refrigerant_type: Option<String>,
    pub notes: Option<String>,
}

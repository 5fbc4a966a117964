use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HvacopsError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

/// Malformed or missing request input. Fatal to the current action.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidField { field: &'static str, value: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("An override verdict requires a reason")]
    OverrideWithoutReason,
}

/// A business-rule violation raised by an otherwise well-formed request.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Equipment must be added under a named system")]
    EquipmentWithoutSystem,

    #[error("System '{system_id}' does not belong to job '{job_id}'")]
    SystemJobMismatch { system_id: String, job_id: String },

    #[error("Job '{job_id}' is not a {expected} job")]
    WrongJobType {
        job_id: String,
        expected: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

pub type Result<T> = std::result::Result<T, HvacopsError>;

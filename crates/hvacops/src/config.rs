//! Host configuration. A small JSON file; every field has a usable default
//! so a missing file is not an error for embedded use.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,

    /// SQLite database location. Defaults to `~/.hvacops/data/hvacops.db`.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Tracing filter directive, e.g. `info` or `hvacops=debug`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: default_version(),
            database_path: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .or_else(crate::db::default_database_path)
            .unwrap_or_else(|| PathBuf::from("hvacops.db"))
    }
}

/// Default config file location: `~/.hvacops/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".hvacops")
        .join("config.json")
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "database_path": "/var/lib/hvacops/jobs.db",
            "log_filter": "hvacops=debug"
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/hvacops/jobs.db")
        );
        assert_eq!(config.log_filter, "hvacops=debug");
    }

    #[test]
    fn test_defaults_fill_in() {
        let config = load_config_from_str("{}").unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.log_filter, "info");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_invalid_version() {
        let result = load_config_from_str(r#"{ "version": "2.0" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("config.json")).unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, r#"{{ "log_filter": "warn" }}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(load_config_from_str("{ not json").is_err());
    }
}

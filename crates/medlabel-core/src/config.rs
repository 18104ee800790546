//! Station configuration.
//!
//! Resolved once when the station is opened and passed into the parts that
//! need it; nothing reads the environment afterwards.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::DEFAULT_INSTRUCTION;
use crate::session::{DEFAULT_MAX_PRINT_QUANTITY, PRINT_QUANTITY_CEILING};

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Label station configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StationConfig {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Directory HTML label sheets are written to
    pub label_output_dir: PathBuf,
    /// Upper bound on labels per basket entry
    pub max_print_quantity: u32,
    /// Instruction used when none is supplied
    pub default_instruction: String,
    /// Name printed in the "By:" footer
    pub prescriber_name: String,
    /// Shown in the label header when no logo is configured
    pub pharmacy_name: String,
    /// Logo image URL for the label header
    pub logo_url: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("medlabel.db"),
            label_output_dir: PathBuf::from("labels"),
            max_print_quantity: DEFAULT_MAX_PRINT_QUANTITY,
            default_instruction: DEFAULT_INSTRUCTION.to_string(),
            prescriber_name: "Dr Mahmoud".to_string(),
            pharmacy_name: "Pharmacy".to_string(),
            logo_url: None,
        }
    }
}

impl StationConfig {
    /// Parse from JSON. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=PRINT_QUANTITY_CEILING).contains(&self.max_print_quantity) {
            return Err(ConfigError::Invalid(format!(
                "max_print_quantity must be between 1 and {}",
                PRINT_QUANTITY_CEILING
            )));
        }
        if self.prescriber_name.trim().is_empty() {
            return Err(ConfigError::Invalid("prescriber_name cannot be empty".into()));
        }
        if self.default_instruction.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_instruction cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StationConfig::default();
        assert_eq!(config.max_print_quantity, 10);
        assert_eq!(config.default_instruction, "Take as directed");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = StationConfig::from_json_str(
            r#"{"database_path": "/tmp/x.db", "pharmacy_name": "Nile Pharmacy"}"#,
        )
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.pharmacy_name, "Nile Pharmacy");
        assert_eq!(config.max_print_quantity, 10);
    }

    #[test]
    fn test_rejects_zero_quantity() {
        let result = StationConfig::from_json_str(r#"{"max_print_quantity": 0}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_oversized_quantity() {
        let result = StationConfig::from_json_str(r#"{"max_print_quantity": 4000000000}"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let config = StationConfig::from_json_str(r#"{"max_print_quantity": 100}"#).unwrap();
        assert_eq!(config.max_print_quantity, PRINT_QUANTITY_CEILING);
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(
            StationConfig::from_json_str("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("station.json");
        std::fs::write(&path, r#"{"prescriber_name": "Dr Hana"}"#).unwrap();

        let config = StationConfig::from_file(&path).unwrap();
        assert_eq!(config.prescriber_name, "Dr Hana");
    }
}

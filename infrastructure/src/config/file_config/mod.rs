//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Enumerated values are kept as strings and parsed on use, so a typo
//! degrades to the default with a warning instead of failing the load.

mod database;
mod graph;
mod llm;
mod logging;
mod output;

pub use database::{CHINOOK_DOWNLOAD_URL, FileDatabaseConfig};
pub use graph::FileGraphConfig;
pub use llm::FileLlmConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;

use serde::{Deserialize, Serialize};
use sql_agent_domain::{ConfigIssue, ConfigIssueCode};
use thiserror::Error;

/// Configuration errors that make a run impossible.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("database.url cannot be empty")]
    EmptyDatabaseUrl,

    #[error("llm.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("llm.timeout_secs cannot be 0")]
    InvalidTimeout,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub database: FileDatabaseConfig,
    pub llm: FileLlmConfig,
    pub graph: FileGraphConfig,
    pub output: FileOutputConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Fail on settings no run can work with.
    pub fn check(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyDatabaseUrl);
        }
        if self.llm.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        Ok(())
    }

    /// Collect non-fatal issues (unknown enum values, suspicious numbers).
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.graph.parse_mode().1);
        issues.extend(self.output.parse_format().1);

        if self.llm.model.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::EmptyValue {
                    field: "llm.model".to_string(),
                },
                "llm.model is empty; the service will pick its own default",
            ));
        }

        if self.graph.top_k == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "graph.top_k".to_string(),
                    value: "0".to_string(),
                },
                "graph.top_k is 0; prompts will ask for queries returning no rows",
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange {
                    field: "llm.temperature".to_string(),
                    value: self.llm.temperature.to_string(),
                },
                format!(
                    "llm.temperature {} is outside 0.0..=2.0",
                    self.llm.temperature
                ),
            ));
        }

        issues
    }

    /// Render the effective configuration as TOML, with the API key masked.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        if shown.llm.api_key.is_some() {
            shown.llm.api_key = Some("********".to_string());
        }
        toml::to_string_pretty(&shown)
    }
}

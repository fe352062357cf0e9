//! Database configuration from TOML (`[database]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the Chinook sample database is fetched from when missing.
pub const CHINOOK_DOWNLOAD_URL: &str =
    "https://storage.googleapis.com/benchmarks-artifacts/chinook/Chinook.db";

/// Raw database configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDatabaseConfig {
    /// Connection URL (`sqlite:///relative.db`, `sqlite:////abs/path.db` or a plain path)
    pub url: String,
    /// Downloaded to the database path when the file does not exist.
    pub download_url: Option<String>,
    /// Limit for the whole download, in seconds.
    pub download_timeout_secs: u64,
    /// Sample rows appended to each table's schema (0 disables them).
    pub sample_rows_in_table_info: usize,
    /// Only these tables are visible (empty = all).
    pub include_tables: Vec<String>,
    /// These tables are hidden.
    pub ignore_tables: Vec<String>,
}

impl FileDatabaseConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

impl Default for FileDatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:///Chinook.db".to_string(),
            download_url: Some(CHINOOK_DOWNLOAD_URL.to_string()),
            download_timeout_secs: 300,
            sample_rows_in_table_info: 3,
            include_tables: Vec::new(),
            ignore_tables: Vec::new(),
        }
    }
}

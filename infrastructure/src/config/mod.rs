//! Configuration file loading for sql-agent
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `SQL_AGENT_<SECTION>__<KEY>` (e.g. `SQL_AGENT_LLM__MODEL`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./sql-agent.toml` or `./.sql-agent.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/sql-agent/config.toml`
//! 5. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    CHINOOK_DOWNLOAD_URL, ConfigValidationError, FileConfig, FileDatabaseConfig,
    FileGraphConfig, FileLlmConfig, FileLoggingConfig, FileOutputConfig,
};
pub use loader::ConfigLoader;

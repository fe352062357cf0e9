//! Infrastructure layer for sql-agent
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer:
//!
//! - [`store`]: SQLite-backed `RelationalStore` plus the sample database fetcher
//! - [`completion`]: OpenAI-compatible `CompletionService`
//! - [`tools`]: JSON Schema rendering of tool definitions
//! - [`logging`]: JSONL conversation log
//! - [`config`]: layered TOML/environment configuration loading

pub mod completion;
pub mod config;
pub mod logging;
pub mod store;
pub mod tools;

// Re-export commonly used types
pub use completion::{OpenAiCompletionService, OpenAiConfig};
pub use config::{
    CHINOOK_DOWNLOAD_URL, ConfigLoader, ConfigValidationError, FileConfig, FileDatabaseConfig,
    FileGraphConfig, FileLlmConfig, FileLoggingConfig, FileOutputConfig,
};
pub use logging::JsonlConversationLogger;
pub use store::{
    FetchError, SqliteOptions, SqliteStore, download_client, ensure_database, sqlite_path,
};
pub use tools::JsonSchemaToolConverter;

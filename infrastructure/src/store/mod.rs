//! Relational store adapters
//!
//! [`SqliteStore`] implements the application's
//! [`RelationalStore`](sql_agent_application::RelationalStore) port with
//! rusqlite. [`fetch`] downloads the sample database on first use.

pub mod fetch;
mod sqlite;
mod url;

pub use fetch::{FetchError, download_client, ensure_database};
pub use sqlite::{SqliteOptions, SqliteStore};
pub use url::sqlite_path;

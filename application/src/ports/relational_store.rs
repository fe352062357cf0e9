//! Relational store port
//!
//! Defines the interface to the SQL database the agent explores.

use async_trait::async_trait;
use sql_agent_domain::{Dialect, QueryRows};
use thiserror::Error;

/// Errors reported by the relational store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The statement was rejected (syntax error, missing table, ...).
    /// The message is the engine's own text.
    #[error("{0}")]
    Query(String),

    #[error("table_names {{{}}} not found in database", format_names(.0))]
    UnknownTables(Vec<String>),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_names(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Port for the SQL database.
///
/// No statement-kind restriction is applied: a mutating statement passed to
/// [`execute`](Self::execute) runs as-is.
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// The SQL variant this store speaks.
    fn dialect(&self) -> Dialect;

    /// Names of the usable tables, sorted.
    async fn list_tables(&self) -> Result<Vec<String>, StoreError>;

    /// Text description (DDL plus sample rows) of the given tables.
    async fn schema(&self, table_names: &[String]) -> Result<String, StoreError>;

    /// Run a statement and return its rows.
    async fn execute(&self, query: &str) -> Result<QueryRows, StoreError>;
}

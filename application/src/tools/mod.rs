//! Tool catalogs backed by application ports.

pub mod sql_toolset;

pub use sql_toolset::{GET_SCHEMA, LIST_TABLES, RUN_QUERY, SqlToolSet, sql_tool_spec};

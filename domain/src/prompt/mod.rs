//! Prompt templates

pub mod sql;

pub use sql::{DEFAULT_TOP_K, SqlPromptTemplate};

//! SQL value types: dialect and tabular results.

pub mod dialect;
pub mod rows;

pub use dialect::Dialect;
pub use rows::{QueryRows, SqlValue};

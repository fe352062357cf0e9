//! Tool domain module
//!
//! Defines how the agent asks for database operations. Every tool is described
//! by a [`ToolDefinition`], requested through a [`ToolInvocation`] carried in an
//! assistant message, and answered with a [`ToolResult`].
//!
//! ```text
//! ┌──────────────┐    ┌────────────────┐    ┌──────────────┐
//! │ ToolSpec     │───▶│ ToolInvocation │───▶│ ToolResult   │
//! │ (catalog)    │    │ (id, args)     │    │ (output/err) │
//! └──────┬───────┘    └────────────────┘    └──────────────┘
//!        │
//!        ├─ aliases: "sql_db_query" → "run_query"
//!        └─ tools:   "run_query" → ToolDefinition
//! ```
//!
//! Models sometimes use the tool names they saw in training data
//! (`sql_db_schema` instead of `get_schema`); [`ToolSpec::resolve`] maps
//! those back to the canonical name without another round trip.

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{InvocationId, ToolDefinition, ToolInvocation, ToolParameter, ToolSpec};
pub use traits::{DefaultToolValidator, ToolValidator};
pub use value_objects::{ToolError, ToolResult, ToolResultMetadata};

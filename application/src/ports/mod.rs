//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod completion_service;
pub mod conversation_logger;
pub mod progress;
pub mod relational_store;
pub mod tool_executor;
pub mod tool_schema;

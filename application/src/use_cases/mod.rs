//! Use cases
//!
//! - [`answer_question`]: the SQL orchestration graph
//! - [`run_react`]: the prebuilt ReAct agent over the same tools

pub mod answer_question;
pub mod run_react;
pub(crate) mod tool_helpers;

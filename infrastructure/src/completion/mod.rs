//! Completion service adapters
//!
//! [`OpenAiCompletionService`] implements the application's
//! `CompletionService` port over the OpenAI chat completions protocol.

mod openai;
mod wire;

pub use openai::{OpenAiCompletionService, OpenAiConfig};

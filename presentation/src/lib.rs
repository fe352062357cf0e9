//! Presentation layer for sql-agent
//!
//! This crate contains the CLI definition, transcript formatting,
//! progress reporting, and the interactive REPL.

pub mod cli;
pub mod output;
pub mod progress;
pub mod repl;
pub mod session;

// Re-export commonly used types
pub use cli::commands::{Cli, DEFAULT_QUESTION, ModeArg, OutputArg};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use repl::Repl;
pub use session::{Agent, SessionError};

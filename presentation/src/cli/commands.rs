//! CLI command definitions

use clap::{Parser, ValueEnum};
use sql_agent_domain::{AgentMode, OutputFormat};
use std::path::PathBuf;

/// Question asked when none is given on the command line.
pub const DEFAULT_QUESTION: &str = "Which sales agent made the most in sales in 2009?";

/// Which agent answers the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Fixed graph: list tables, fetch schema, generate, check and run queries
    Graph,
    /// Free-form tool loop
    React,
}

impl From<ModeArg> for AgentMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Graph => AgentMode::Graph,
            ModeArg::React => AgentMode::React,
        }
    }
}

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Every message as the graph produces it
    Steps,
    /// Only the final answer
    Answer,
    /// The final transcript as JSON
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Steps => OutputFormat::Steps,
            OutputArg::Answer => OutputFormat::Answer,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for sql-agent
#[derive(Parser, Debug)]
#[command(name = "sql-agent")]
#[command(author, version, about = "Answer questions about a SQL database with a tool-calling agent")]
#[command(long_about = r#"
sql-agent answers natural-language questions about a SQLite database.

In graph mode (default) the agent lists the tables, fetches the relevant
schema, drafts a query, double-checks it and runs it, looping until the
model answers in plain text. React mode gives the model all tools at once.

Configuration files are loaded from (in priority order):
1. --config <path>                        Explicit config file
2. ./sql-agent.toml or ./.sql-agent.toml  Project-level config
3. ~/.config/sql-agent/config.toml        Global config
Environment variables (SQL_AGENT_LLM__MODEL, ...) override files.

Example:
  sql-agent "Which country's customers spent the most?"
  sql-agent -o steps --mode react "How many albums does AC/DC have?"
  sql-agent -i --db sqlite:///data/music.db
"#)]
pub struct Cli {
    /// The question to ask (defaults to a demo question about Chinook)
    pub question: Option<String>,

    /// Start an interactive session
    #[arg(short, long)]
    pub interactive: bool,

    /// Agent mode (overrides graph.mode)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Database URL, e.g. sqlite:///Chinook.db (overrides database.url)
    #[arg(long, value_name = "URL")]
    pub db: Option<String>,

    /// Model name (overrides llm.model)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum query generation passes, 0 for unbounded (overrides graph.max_iterations)
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<usize>,

    /// Output format (overrides output.format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputArg>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Write a JSONL transcript of every step (overrides logging.conversation_log)
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,
}

impl Cli {
    /// The question for a one-shot run.
    pub fn question_or_default(&self) -> &str {
        self.question
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(DEFAULT_QUESTION)
    }

    /// Tracing filter directive for the `-v` count.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["sql-agent"]);
        assert_eq!(cli.question_or_default(), DEFAULT_QUESTION);
        assert!(!cli.interactive);
        assert!(cli.mode.is_none());
        assert!(cli.output.is_none());
        assert_eq!(cli.log_level(), "warn");
    }

    #[test]
    fn test_overrides_parse() {
        let cli = Cli::parse_from([
            "sql-agent",
            "--mode",
            "react",
            "-o",
            "json",
            "--db",
            "sqlite:///tmp/x.db",
            "--max-iterations",
            "3",
            "-vv",
            "How many tracks?",
        ]);
        assert_eq!(cli.mode.map(AgentMode::from), Some(AgentMode::React));
        assert_eq!(cli.output.map(OutputFormat::from), Some(OutputFormat::Json));
        assert_eq!(cli.db.as_deref(), Some("sqlite:///tmp/x.db"));
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.question_or_default(), "How many tracks?");
        assert_eq!(cli.log_level(), "debug");
    }

    #[test]
    fn test_blank_question_falls_back() {
        let cli = Cli::parse_from(["sql-agent", "   "]);
        assert_eq!(cli.question_or_default(), DEFAULT_QUESTION);
    }
}

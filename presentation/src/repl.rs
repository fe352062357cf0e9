//! Interactive session: one fresh graph run per line

use crate::progress::reporter::ProgressReporter;
use crate::session::{Agent, SessionError};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use sql_agent_application::{GraphProgressNotifier, NoProgress};
use sql_agent_domain::{OutputFormat, Question};
use std::path::PathBuf;
use tracing::warn;

const HISTORY_SIZE: usize = 1000;

/// A parsed REPL input line
#[derive(Debug, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Quit,
    Help,
    ShowMode,
    SetFormat(OutputFormat),
    Unknown(String),
    Question(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return ReplInput::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return ReplInput::Question(line.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next().unwrap_or(""), parts.next()) {
            ("quit" | "exit" | "q", None) => ReplInput::Quit,
            ("help" | "h" | "?", None) => ReplInput::Help,
            ("mode", None) => ReplInput::ShowMode,
            ("format", Some(value)) => match value.parse() {
                Ok(format) => ReplInput::SetFormat(format),
                Err(_) => ReplInput::Unknown(line.to_string()),
            },
            _ => ReplInput::Unknown(line.to_string()),
        }
    }
}

/// Default history location under the platform data directory.
pub fn default_history_file() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sql-agent").join("history.txt"))
}

/// Interactive REPL
pub struct Repl {
    agent: Agent,
    format: OutputFormat,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl Repl {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            format: OutputFormat::default(),
            show_progress: true,
            history_file: default_history_file(),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_file else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_SIZE, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("History disabled ({}): {}", path.display(), e);
                editor
            }
        }
    }

    /// Run until `/quit` or Ctrl-D.
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("sql-agent".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            let line = match editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => line,
                // Ctrl-C discards the line being edited.
                Ok(Signal::CtrlC) => continue,
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    break;
                }
            };

            match ReplInput::parse(&line) {
                ReplInput::Empty => {}
                ReplInput::Quit => {
                    println!("Bye!");
                    break;
                }
                ReplInput::Help => Self::print_help(),
                ReplInput::ShowMode => {
                    println!("Mode: {}, output: {}", self.agent.mode(), self.format.as_str())
                }
                ReplInput::SetFormat(format) => {
                    self.format = format;
                    println!("Output format: {}", format.as_str());
                }
                ReplInput::Unknown(cmd) => {
                    println!("Unknown command: {}", cmd);
                    println!("Type /help for available commands");
                }
                ReplInput::Question(text) => self.process_question(&text).await,
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "sql-agent - interactive mode".cyan().bold());
        println!("Mode: {}", self.agent.mode());
        println!("Each line is answered in a fresh session. Ctrl-C cancels, Ctrl-D exits.");
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?                 - Show this help");
        println!("  /mode                         - Show agent mode and output format");
        println!("  /format steps|answer|json     - Change output format");
        println!("  /quit, /exit, /q              - Exit");
        println!();
    }

    async fn process_question(&self, text: &str) {
        let question = match Question::new(text) {
            Ok(q) => q,
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                return;
            }
        };

        let reporter;
        let progress: &dyn GraphProgressNotifier =
            if self.show_progress && self.format != OutputFormat::Steps {
                reporter = ProgressReporter::new();
                &reporter
            } else {
                &NoProgress
            };

        let mut stdout = std::io::stdout();
        // Dropping the run future cancels the session.
        tokio::select! {
            result = self.agent.ask(&question, self.format, progress, &mut stdout) => {
                if let Err(e) = result {
                    report_error(&e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("{}", "Cancelled".yellow());
            }
        }
        println!();
    }
}

fn report_error(error: &SessionError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

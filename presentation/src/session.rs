//! Running one question through the configured agent and printing it

use crate::output::console::ConsoleFormatter;
use futures::StreamExt;
use sql_agent_application::{
    AnswerQuestionError, AnswerQuestionUseCase, GraphError, GraphProgressNotifier, RunReactError,
    RunReactUseCase, StepStream,
};
use sql_agent_domain::{AgentMode, ConversationState, OutputFormat, Question};
use std::io::Write;
use thiserror::Error;

/// Errors from a session started at the terminal.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("{0}")]
    NoAnswer(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl From<AnswerQuestionError> for SessionError {
    fn from(e: AnswerQuestionError) -> Self {
        match e {
            AnswerQuestionError::Graph(e) => SessionError::Graph(e),
            other => SessionError::NoAnswer(other.to_string()),
        }
    }
}

impl From<RunReactError> for SessionError {
    fn from(e: RunReactError) -> Self {
        match e {
            RunReactError::Graph(e) => SessionError::Graph(e),
            other => SessionError::NoAnswer(other.to_string()),
        }
    }
}

/// The agent selected by `graph.mode`.
pub enum Agent {
    Graph(AnswerQuestionUseCase),
    React(RunReactUseCase),
}

impl Agent {
    pub fn mode(&self) -> AgentMode {
        match self {
            Agent::Graph(_) => AgentMode::Graph,
            Agent::React(_) => AgentMode::React,
        }
    }

    pub fn stream<'a>(
        &'a self,
        question: &Question,
        progress: &'a dyn GraphProgressNotifier,
    ) -> StepStream<'a> {
        match self {
            Agent::Graph(use_case) => use_case.stream_with_progress(question, progress),
            Agent::React(use_case) => use_case.stream_with_progress(question, progress),
        }
    }

    fn finish(&self, question: &Question, state: &ConversationState) -> Result<(), SessionError> {
        match self {
            Agent::Graph(use_case) => use_case.finish(question, state)?,
            Agent::React(use_case) => use_case.finish(question, state)?,
        }
        Ok(())
    }

    /// Answer `question`, printing to `out` in `format`.
    ///
    /// With [`OutputFormat::Steps`] messages are printed while the graph runs;
    /// the other formats print once the run has finished.
    pub async fn ask<W: Write>(
        &self,
        question: &Question,
        format: OutputFormat,
        progress: &dyn GraphProgressNotifier,
        out: &mut W,
    ) -> Result<ConversationState, SessionError> {
        let state = print_steps(self.stream(question, progress), format, out).await?;
        self.finish(question, &state)?;

        match format {
            OutputFormat::Steps => {}
            OutputFormat::Answer => writeln!(out, "{}", ConsoleFormatter::format_answer(&state))?,
            OutputFormat::Json => writeln!(out, "{}", ConsoleFormatter::format_json(&state))?,
        }
        Ok(state)
    }
}

/// Drain `steps`, printing newly appended messages when `format` is `Steps`.
///
/// Returns the last state. Messages already printed stay on screen when the
/// stream fails.
pub async fn print_steps<W: Write>(
    mut steps: StepStream<'_>,
    format: OutputFormat,
    out: &mut W,
) -> Result<ConversationState, SessionError> {
    let mut printed = 0;
    let mut last = None;

    while let Some(step) = steps.next().await {
        let snapshot = step?;
        if format == OutputFormat::Steps {
            for message in snapshot.state.messages().get(printed..).unwrap_or(&[]) {
                writeln!(out, "{}", ConsoleFormatter::format_message(message))?;
            }
            printed = snapshot.state.len();
        }
        last = Some(snapshot.state);
    }

    last.ok_or_else(|| SessionError::NoAnswer("The graph produced no steps".to_string()))
}

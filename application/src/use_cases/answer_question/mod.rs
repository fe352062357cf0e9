//! Answer Question use case.
//!
//! Answers a natural-language question about the database by running the
//! SQL orchestration graph:
//!
//! ```text
//! list_tables ─▶ call_get_schema ─▶ get_schema ─▶ generate_query ─┬─▶ END (text answer)
//!                                                      ▲           │
//!                                                      │           ▼
//!                                                  run_query ◀─ check_query
//! ```
//!
//! `list_tables` is deterministic scaffolding. Every other model step goes
//! through the [`CompletionService`]; every tool call goes through the
//! [`ToolExecutorPort`]. Tool failures are fed back into the transcript,
//! service failures end the run.

pub mod nodes;

use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::json;
use sql_agent_domain::util::truncate_str;
use sql_agent_domain::{ConversationState, Dialect, Question};
use thiserror::Error;
use tracing::info;

use crate::config::GraphParams;
use crate::graph::{CompilationError, CompiledGraph, GraphError, Snapshot, StateGraph};
use crate::ports::completion_service::CompletionService;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{GraphProgressNotifier, NoProgress};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::tools::{GET_SCHEMA, RUN_QUERY};
use nodes::*;

/// Errors that can occur while answering a question.
#[derive(Error, Debug)]
pub enum AnswerQuestionError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("The run ended without a text answer")]
    NoAnswer,
}

pub type StepStream<'a> = BoxStream<'a, Result<Snapshot<ConversationState>, GraphError>>;

/// Use case wrapping the compiled orchestration graph.
pub struct AnswerQuestionUseCase {
    graph: CompiledGraph<ConversationState>,
    model: String,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl AnswerQuestionUseCase {
    /// Build and compile the graph.
    pub fn new(
        service: Arc<dyn CompletionService>,
        tools: Arc<dyn ToolExecutorPort>,
        dialect: Dialect,
        params: GraphParams,
    ) -> Result<Self, CompilationError> {
        let model = service.model_name().to_string();
        let limit = params.iteration_limit();

        let mut builder = StateGraph::new()
            .add_node(ListTablesNode::new(tools.clone()))
            .add_node(CallGetSchemaNode::new(service.clone(), tools.clone()))
            .add_node(ToolNode::new(GET_SCHEMA_NODE, &[GET_SCHEMA], tools.clone()))
            .add_node(GenerateQueryNode::new(
                service.clone(),
                tools.clone(),
                dialect.clone(),
                params.top_k,
                limit,
            ))
            .add_node(CheckQueryNode::new(service, tools.clone(), dialect))
            .add_node(ToolNode::new(RUN_QUERY_NODE, &[RUN_QUERY], tools))
            .set_entry_point(LIST_TABLES_NODE)
            .add_edge(LIST_TABLES_NODE, CALL_GET_SCHEMA_NODE)
            .add_edge(CALL_GET_SCHEMA_NODE, GET_SCHEMA_NODE)
            .add_edge(GET_SCHEMA_NODE, GENERATE_QUERY_NODE)
            .add_conditional_edges(GENERATE_QUERY_NODE, route_after_generation)
            .add_edge(CHECK_QUERY_NODE, RUN_QUERY_NODE)
            .add_edge(RUN_QUERY_NODE, GENERATE_QUERY_NODE);

        // Backstop behind the generation guard: three setup steps, three per pass.
        if let Some(limit) = limit {
            builder = builder.with_recursion_limit(3 * limit + 4);
        }

        Ok(Self {
            graph: builder.compile()?,
            model,
            conversation_logger: Arc::new(NoConversationLogger),
        })
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn graph(&self) -> &CompiledGraph<ConversationState> {
        &self.graph
    }

    /// Lazily run the graph for `question`, one snapshot per node.
    pub fn stream(&self, question: &Question) -> StepStream<'_> {
        self.stream_with_progress(question, &NoProgress)
    }

    pub fn stream_with_progress<'a>(
        &'a self,
        question: &Question,
        progress: &'a dyn GraphProgressNotifier,
    ) -> StepStream<'a> {
        info!(
            model = %self.model,
            "Answering question: {}",
            truncate_str(question.content(), 100)
        );
        let logger = self.conversation_logger.clone();
        self.graph
            .stream_with_progress(ConversationState::new(question), progress)
            .inspect(move |step| {
                if let Ok(snapshot) = step {
                    logger.log(ConversationEvent::new(
                        "graph_step",
                        json!({
                            "node": snapshot.node,
                            "step": snapshot.step,
                            "messages": snapshot.state.len(),
                            "last": snapshot.state.last(),
                        }),
                    ));
                }
            })
            .boxed()
    }

    /// Run to completion and return the final transcript.
    pub async fn execute(
        &self,
        question: &Question,
    ) -> Result<ConversationState, AnswerQuestionError> {
        self.execute_with_progress(question, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        question: &Question,
        progress: &dyn GraphProgressNotifier,
    ) -> Result<ConversationState, AnswerQuestionError> {
        let mut steps = self.stream_with_progress(question, progress);
        let mut last = None;
        while let Some(step) = steps.next().await {
            last = Some(step?.state);
        }
        drop(steps);

        let state = last.ok_or(AnswerQuestionError::NoAnswer)?;
        self.finish(question, &state)?;
        Ok(state)
    }

    /// Record the end of a session driven through [`stream`](Self::stream).
    ///
    /// Fails when the final state carries no text answer.
    pub fn finish(
        &self,
        question: &Question,
        state: &ConversationState,
    ) -> Result<(), AnswerQuestionError> {
        let answer = state.final_answer().ok_or(AnswerQuestionError::NoAnswer)?;
        self.conversation_logger.log(ConversationEvent::new(
            "session_complete",
            json!({
                "question": question.content(),
                "answer": answer,
                "generation_passes": state.generation_passes(),
                "messages": state.len(),
            }),
        ));
        info!(passes = state.generation_passes(), "Question answered");
        Ok(())
    }
}

//! Run ReAct use case.
//!
//! The prebuilt alternative to the SQL graph: a single agent node that sees
//! every SQL tool, looping through a tool node until it answers in text.
//!
//! ```text
//! agent ─┬─▶ END (text answer, or tool turn limit reached)
//!   ▲    ▼
//!   └── tools
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::json;
use sql_agent_domain::util::truncate_str;
use sql_agent_domain::{ConversationState, Dialect, Message, Question, SqlPromptTemplate};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::answer_question::nodes::ToolNode;
use crate::config::GraphParams;
use crate::graph::{
    CompilationError, CompiledGraph, GraphError, Next, Node, Snapshot, StateGraph,
};
use crate::ports::completion_service::{CompletionService, ToolChoice};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{GraphProgressNotifier, NoProgress};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::tools::{GET_SCHEMA, LIST_TABLES, RUN_QUERY};

pub const AGENT_NODE: &str = "agent";
pub const TOOLS_NODE: &str = "tools";

const ALL_TOOLS: &[&str] = &[LIST_TABLES, GET_SCHEMA, RUN_QUERY];

/// Errors that can occur during a ReAct run.
#[derive(Error, Debug)]
pub enum RunReactError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Stopped after {turns} tool turns without a text answer")]
    NoAnswer { turns: usize },
}

struct AgentNode {
    service: Arc<dyn CompletionService>,
    tools: Arc<dyn ToolExecutorPort>,
    system_prompt: String,
}

#[async_trait]
impl Node<ConversationState> for AgentNode {
    fn id(&self) -> &str {
        AGENT_NODE
    }

    async fn run(&self, mut state: ConversationState) -> Result<ConversationState, GraphError> {
        let mut messages = Vec::with_capacity(state.len() + 1);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend_from_slice(state.messages());

        let definitions = self.tools.definitions(ALL_TOOLS);
        let response = self
            .service
            .generate(&messages, &definitions, ToolChoice::Auto)
            .await?;

        state.record_generation_pass();
        debug!(
            turn = state.generation_passes(),
            calls = response.invocations().len(),
            "ReAct agent turn"
        );
        state.append(response);
        Ok(state)
    }
}

fn route_after_agent(state: &ConversationState, max_tool_turns: Option<usize>) -> Next {
    if !state.last().is_some_and(Message::has_invocations) {
        return Next::End;
    }
    match max_tool_turns {
        Some(max) if state.generation_passes() > max => {
            warn!("ReAct tool loop exceeded max_tool_turns ({})", max);
            Next::End
        }
        _ => Next::node(TOOLS_NODE),
    }
}

/// Use case for the ReAct agent.
pub struct RunReactUseCase {
    graph: CompiledGraph<ConversationState>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RunReactUseCase {
    pub fn new(
        service: Arc<dyn CompletionService>,
        tools: Arc<dyn ToolExecutorPort>,
        dialect: Dialect,
        params: GraphParams,
    ) -> Result<Self, CompilationError> {
        let max_turns = params.tool_turn_limit();
        let agent = AgentNode {
            service,
            tools: tools.clone(),
            system_prompt: SqlPromptTemplate::system(&dialect, params.top_k),
        };

        let mut builder = StateGraph::new()
            .add_node(agent)
            .add_node(ToolNode::new(TOOLS_NODE, ALL_TOOLS, tools))
            .set_entry_point(AGENT_NODE)
            .add_conditional_edges(AGENT_NODE, move |s: &ConversationState| {
                route_after_agent(s, max_turns)
            })
            .add_edge(TOOLS_NODE, AGENT_NODE);
        if let Some(max) = max_turns {
            builder = builder.with_recursion_limit(2 * max + 2);
        }

        Ok(Self {
            graph: builder.compile()?,
            conversation_logger: Arc::new(NoConversationLogger),
        })
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn stream(
        &self,
        question: &Question,
    ) -> BoxStream<'_, Result<Snapshot<ConversationState>, GraphError>> {
        self.stream_with_progress(question, &NoProgress)
    }

    pub fn stream_with_progress<'a>(
        &'a self,
        question: &Question,
        progress: &'a dyn GraphProgressNotifier,
    ) -> BoxStream<'a, Result<Snapshot<ConversationState>, GraphError>> {
        info!("Starting ReAct run: {}", truncate_str(question.content(), 100));
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

    pub async fn execute(&self, question: &Question) -> Result<ConversationState, RunReactError> {
        self.execute_with_progress(question, &NoProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        question: &Question,
        progress: &dyn GraphProgressNotifier,
    ) -> Result<ConversationState, RunReactError> {
        let mut state = ConversationState::new(question);
        let mut steps = self.stream_with_progress(question, progress);
        while let Some(step) = steps.next().await {
            state = step?.state;
        }
        drop(steps);

        self.finish(question, &state)?;
        Ok(state)
    }

    /// Record the end of a streamed session; fails without a text answer.
    pub fn finish(&self, question: &Question, state: &ConversationState) -> Result<(), RunReactError> {
        let turns = state.generation_passes().saturating_sub(1);
        let Some(answer) = state.final_answer() else {
            return Err(RunReactError::NoAnswer { turns });
        };
        self.conversation_logger.log(ConversationEvent::new(
            "session_complete",
            json!({
                "question": question.content(),
                "answer": answer,
                "tool_turns": turns,
            }),
        ));
        info!("ReAct completed in {} tool turns", turns);
        Ok(())
    }
}

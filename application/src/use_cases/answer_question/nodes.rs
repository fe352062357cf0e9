//! Nodes of the question-answering graph.

use std::sync::Arc;

use async_trait::async_trait;
use sql_agent_domain::{
    ConversationState, Dialect, InvocationId, Message, SqlPromptTemplate, ToolError,
    ToolInvocation, ToolResult,
};
use tracing::{debug, info, warn};

use crate::graph::{GraphError, Next, Node};
use crate::ports::completion_service::{CompletionService, ToolChoice};
use crate::ports::tool_executor::ToolExecutorPort;
use crate::tools::{GET_SCHEMA, LIST_TABLES, RUN_QUERY};
use crate::use_cases::tool_helpers::{canonical_name, invocation_preview};

/// Node ids
pub const LIST_TABLES_NODE: &str = "list_tables";
pub const CALL_GET_SCHEMA_NODE: &str = "call_get_schema";
pub const GET_SCHEMA_NODE: &str = "get_schema";
pub const GENERATE_QUERY_NODE: &str = "generate_query";
pub const CHECK_QUERY_NODE: &str = "check_query";
pub const RUN_QUERY_NODE: &str = "run_query";

/// Routes after `generate_query`: a tool request goes to the checker,
/// free text ends the run.
pub fn route_after_generation(state: &ConversationState) -> Next {
    match state.last() {
        Some(message) if message.has_invocations() => Next::node(CHECK_QUERY_NODE),
        _ => Next::End,
    }
}

/// Deterministic first step: lists the tables without asking the model.
pub struct ListTablesNode {
    tools: Arc<dyn ToolExecutorPort>,
}

impl ListTablesNode {
    pub fn new(tools: Arc<dyn ToolExecutorPort>) -> Self {
        Self { tools }
    }
}

#[async_trait]
impl Node<ConversationState> for ListTablesNode {
    fn id(&self) -> &str {
        LIST_TABLES_NODE
    }

    async fn run(&self, mut state: ConversationState) -> Result<ConversationState, GraphError> {
        let id = InvocationId::synthetic(LIST_TABLES, state.next_sequence());
        let call = ToolInvocation::new(id, LIST_TABLES);
        let result = self.tools.execute(&call).await;

        let summary = format!("Available tables: {}", result.content());
        state.append(Message::tool_request(vec![call.clone()]));
        state.append(Message::tool_output(&call, &result));
        state.append(Message::assistant(summary));
        Ok(state)
    }
}

/// Asks the model for a `get_schema` call over the full history.
pub struct CallGetSchemaNode {
    service: Arc<dyn CompletionService>,
    tools: Arc<dyn ToolExecutorPort>,
}

impl CallGetSchemaNode {
    pub fn new(service: Arc<dyn CompletionService>, tools: Arc<dyn ToolExecutorPort>) -> Self {
        Self { service, tools }
    }
}

#[async_trait]
impl Node<ConversationState> for CallGetSchemaNode {
    fn id(&self) -> &str {
        CALL_GET_SCHEMA_NODE
    }

    async fn run(&self, mut state: ConversationState) -> Result<ConversationState, GraphError> {
        let definitions = self.tools.definitions(&[GET_SCHEMA]);
        let response = self
            .service
            .generate(state.messages(), &definitions, ToolChoice::Required)
            .await?;
        if !response.has_invocations() {
            warn!("Model answered without requesting a schema");
        }
        state.append(response);
        Ok(state)
    }
}

/// Resolves every pending invocation through the tool set.
///
/// Only tools in `allowed` run; any other request is answered with an error
/// result so the transcript stays balanced.
pub struct ToolNode {
    id: &'static str,
    allowed: &'static [&'static str],
    tools: Arc<dyn ToolExecutorPort>,
}

impl ToolNode {
    pub fn new(
        id: &'static str,
        allowed: &'static [&'static str],
        tools: Arc<dyn ToolExecutorPort>,
    ) -> Self {
        Self { id, allowed, tools }
    }

    async fn resolve(&self, call: &ToolInvocation) -> ToolResult {
        let name = canonical_name(self.tools.tool_spec(), call);
        if !self.allowed.contains(&name) {
            return ToolResult::failure(
                &call.tool_name,
                ToolError::invalid_argument(format!(
                    "{} is not available at this step, use one of [{}]",
                    call.tool_name,
                    self.allowed.join(", ")
                )),
            );
        }
        self.tools.execute(call).await
    }
}

#[async_trait]
impl Node<ConversationState> for ToolNode {
    fn id(&self) -> &str {
        self.id
    }

    async fn run(&self, mut state: ConversationState) -> Result<ConversationState, GraphError> {
        let pending: Vec<ToolInvocation> =
            state.pending_invocations().into_iter().cloned().collect();

        for call in &pending {
            debug!(tool = %call.tool_name, args = %invocation_preview(call), "Resolving invocation");
            let result = self.resolve(call).await;
            if let Some(err) = result.error() {
                info!(tool = %call.tool_name, code = %err.code, "Tool returned an error");
            }
            state.append(Message::tool_output(call, &result));
        }
        Ok(state)
    }
}

/// Drafts a query (or the final answer) under the query generation prompt.
pub struct GenerateQueryNode {
    service: Arc<dyn CompletionService>,
    tools: Arc<dyn ToolExecutorPort>,
    dialect: Dialect,
    top_k: usize,
    iteration_limit: Option<usize>,
}

impl GenerateQueryNode {
    pub fn new(
        service: Arc<dyn CompletionService>,
        tools: Arc<dyn ToolExecutorPort>,
        dialect: Dialect,
        top_k: usize,
        iteration_limit: Option<usize>,
    ) -> Self {
        Self {
            service,
            tools,
            dialect,
            top_k,
            iteration_limit,
        }
    }
}

#[async_trait]
impl Node<ConversationState> for GenerateQueryNode {
    fn id(&self) -> &str {
        GENERATE_QUERY_NODE
    }

    async fn run(&self, mut state: ConversationState) -> Result<ConversationState, GraphError> {
        if let Some(limit) = self.iteration_limit
            && state.generation_passes() >= limit
        {
            warn!(limit, "Query generation limit reached");
            return Err(GraphError::IterationLimit { limit });
        }

        // The system prompt is rebuilt for every request and never stored.
        let mut messages = Vec::with_capacity(state.len() + 1);
        messages.push(Message::system(SqlPromptTemplate::generate_query(
            &self.dialect,
            self.top_k,
        )));
        messages.extend_from_slice(state.messages());

        let definitions = self.tools.definitions(&[RUN_QUERY]);
        let response = self
            .service
            .generate(&messages, &definitions, ToolChoice::Auto)
            .await?;

        state.record_generation_pass();
        debug!(
            pass = state.generation_passes(),
            tool_call = response.has_invocations(),
            "Query generation pass"
        );
        state.append(response);
        Ok(state)
    }
}

/// Reviews each pending draft query in a fresh two-message context.
///
/// Every reviewed call is appended as a correction of its draft, carrying the
/// draft's id. A text reply re-emits the draft unchanged.
pub struct CheckQueryNode {
    service: Arc<dyn CompletionService>,
    tools: Arc<dyn ToolExecutorPort>,
    dialect: Dialect,
}

impl CheckQueryNode {
    pub fn new(
        service: Arc<dyn CompletionService>,
        tools: Arc<dyn ToolExecutorPort>,
        dialect: Dialect,
    ) -> Self {
        Self {
            service,
            tools,
            dialect,
        }
    }

    async fn review(
        &self,
        draft: &ToolInvocation,
        query: &str,
    ) -> Result<ToolInvocation, GraphError> {
        let context = [
            Message::system(SqlPromptTemplate::check_query(&self.dialect)),
            Message::user(query),
        ];
        let definitions = self.tools.definitions(&[RUN_QUERY]);
        let response = self
            .service
            .generate(&context, &definitions, ToolChoice::Required)
            .await?;

        let spec = self.tools.tool_spec();
        let reviewed = response
            .invocations()
            .iter()
            .find(|call| canonical_name(spec, call) == RUN_QUERY)
            .cloned();
        let reviewed = match reviewed {
            Some(call) => call,
            None => {
                warn!(id = %draft.id, "Query check returned no run_query call; keeping the draft");
                draft.clone()
            }
        };
        if reviewed.get_string("query") != Some(query) {
            info!(query = %invocation_preview(&reviewed), "Query rewritten by check");
        }
        Ok(reviewed)
    }
}

#[async_trait]
impl Node<ConversationState> for CheckQueryNode {
    fn id(&self) -> &str {
        CHECK_QUERY_NODE
    }

    async fn run(&self, mut state: ConversationState) -> Result<ConversationState, GraphError> {
        let spec = self.tools.tool_spec();
        let drafts: Vec<(ToolInvocation, String)> = state
            .pending_invocations()
            .into_iter()
            .filter_map(|draft| match draft.get_string("query") {
                Some(q) if canonical_name(spec, draft) == RUN_QUERY => {
                    Some((draft.clone(), q.to_string()))
                }
                // Nothing to review; run_query reports the problem to the model.
                _ => {
                    debug!(tool = %draft.tool_name, "Draft is not a reviewable query");
                    None
                }
            })
            .collect();

        for (draft, query) in drafts {
            let reviewed = self.review(&draft, &query).await?;
            state.append(Message::correction(&draft.id, reviewed));
        }
        Ok(state)
    }
}

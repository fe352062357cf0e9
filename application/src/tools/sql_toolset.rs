//! SQL tools: list_tables, get_schema, run_query
//!
//! [`SqlToolSet`] is the [`ToolExecutorPort`] the question-answering use
//! cases drive. Every tool delegates to a [`RelationalStore`]; store failures
//! come back as failed [`ToolResult`]s so the model can read them and retry.
//!
//! The LangChain names (`sql_db_list_tables`, `sql_db_schema`,
//! `sql_db_query`) are registered as aliases, since models primed on that
//! toolkit keep emitting them.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sql_agent_domain::{
    DefaultToolValidator, Dialect, ToolDefinition, ToolError, ToolInvocation, ToolParameter,
    ToolResult, ToolSpec, ToolValidator,
};
use tracing::debug;

use crate::ports::relational_store::{RelationalStore, StoreError};
use crate::ports::tool_executor::ToolExecutorPort;

/// Tool name constants
pub const LIST_TABLES: &str = "list_tables";
pub const GET_SCHEMA: &str = "get_schema";
pub const RUN_QUERY: &str = "run_query";

pub fn list_tables_definition() -> ToolDefinition {
    ToolDefinition::new(
        LIST_TABLES,
        "Output is a comma-separated list of tables in the database.",
    )
}

pub fn get_schema_definition() -> ToolDefinition {
    ToolDefinition::new(
        GET_SCHEMA,
        "Output is the schema and sample rows for the given tables. \
         Be sure that the tables actually exist by calling list_tables first!",
    )
    .with_parameter(
        ToolParameter::new(
            "table_names",
            "Comma-separated list of tables. Example: table1, table2, table3",
            true,
        )
        .with_type("string"),
    )
}

pub fn run_query_definition() -> ToolDefinition {
    ToolDefinition::new(
        RUN_QUERY,
        "Execute a detailed and correct SQL query and return the result from the database. \
         If the query is not correct, an error message will be returned. If an error is \
         returned, rewrite the query, check the query, and try again. If you encounter an \
         issue with Unknown column 'xxxx' in 'field list', use get_schema to query the \
         correct table fields.",
    )
    .with_parameter(ToolParameter::new("query", "A single SQL statement", true).with_type("string"))
}

/// The three SQL tools plus their LangChain aliases.
pub fn sql_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(list_tables_definition())
        .register(get_schema_definition())
        .register(run_query_definition())
        .register_alias("sql_db_list_tables", LIST_TABLES)
        .register_alias("sql_db_schema", GET_SCHEMA)
        .register_alias("sql_db_query", RUN_QUERY)
}

/// Tool executor over a relational store.
#[derive(Clone)]
pub struct SqlToolSet {
    store: Arc<dyn RelationalStore>,
    tool_spec: ToolSpec,
}

impl SqlToolSet {
    pub fn new(store: Arc<dyn RelationalStore>) -> Self {
        Self {
            store,
            tool_spec: sql_tool_spec(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.store.dialect()
    }

    async fn list_tables(&self) -> ToolResult {
        match self.store.list_tables().await {
            Ok(tables) => ToolResult::success(LIST_TABLES, tables.join(", ")),
            Err(e) => ToolResult::failure(LIST_TABLES, store_failure(e)),
        }
    }

    async fn get_schema(&self, call: &ToolInvocation) -> ToolResult {
        let raw = match call.require_string("table_names") {
            Ok(s) => s,
            Err(e) => return ToolResult::failure(GET_SCHEMA, ToolError::invalid_argument(e)),
        };
        let tables = split_table_names(raw);
        if tables.is_empty() {
            return ToolResult::failure(
                GET_SCHEMA,
                ToolError::invalid_argument("table_names must name at least one table"),
            );
        }

        match self.store.schema(&tables).await {
            Ok(schema) => ToolResult::success(GET_SCHEMA, schema),
            Err(e) => ToolResult::failure(GET_SCHEMA, store_failure(e)),
        }
    }

    async fn run_query(&self, call: &ToolInvocation) -> ToolResult {
        let query = match call.require_string("query") {
            Ok(q) => q,
            Err(e) => return ToolResult::failure(RUN_QUERY, ToolError::invalid_argument(e)),
        };

        match self.store.execute(query).await {
            Ok(rows) => ToolResult::success(RUN_QUERY, rows.render()).with_row_count(rows.len()),
            // Any store failure of a statement is reported as a query failure.
            Err(e) => ToolResult::failure(RUN_QUERY, ToolError::query_failed(e.to_string())),
        }
    }
}

#[async_trait]
impl ToolExecutorPort for SqlToolSet {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    async fn execute(&self, call: &ToolInvocation) -> ToolResult {
        let start = Instant::now();

        let Some(definition) = self.tool_spec.get_resolved(&call.tool_name) else {
            return ToolResult::failure(
                &call.tool_name,
                ToolError::not_found(format!(
                    "{} is not a valid tool, try one of [{}].",
                    call.tool_name,
                    self.available_tools().join(", ")
                )),
            );
        };

        if let Err(e) = DefaultToolValidator.validate(call, definition) {
            return ToolResult::failure(&definition.name, ToolError::invalid_argument(e));
        }

        let result = match definition.name.as_str() {
            LIST_TABLES => self.list_tables().await,
            GET_SCHEMA => self.get_schema(call).await,
            RUN_QUERY => self.run_query(call).await,
            other => ToolResult::failure(
                other,
                ToolError::execution_failed(format!("Tool '{}' is not implemented", other)),
            ),
        };

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            tool = %result.tool_name,
            id = %call.id,
            success = result.is_success(),
            duration_ms = elapsed,
            "Tool executed"
        );
        result.with_duration(elapsed)
    }
}

fn split_table_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn store_failure(err: StoreError) -> ToolError {
    match err {
        StoreError::UnknownTables(_) => ToolError::not_found(err.to_string()),
        StoreError::Query(msg) => ToolError::query_failed(msg),
        StoreError::Connection(_) | StoreError::Internal(_) => {
            ToolError::execution_failed(err.to_string())
        }
    }
}

//! Deterministic doubles shared by the use case tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use sql_agent_domain::{Dialect, Message, QueryRows, SqlValue, ToolDefinition, ToolInvocation};

use crate::ports::completion_service::{CompletionService, ServiceError, ToolChoice};
use crate::ports::relational_store::{RelationalStore, StoreError};

/// One request seen by [`ScriptedService`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<String>,
    pub choice: ToolChoice,
}

/// Completion service that replays a fixed list of responses.
pub(crate) struct ScriptedService {
    responses: Mutex<VecDeque<Result<Message, ServiceError>>>,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedService {
    pub fn new(responses: Vec<Message>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<Message, ServiceError>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request(&self, index: usize) -> RecordedRequest {
        self.requests.lock().unwrap()[index].clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        choice: ToolChoice,
    ) -> Result<Message, ServiceError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
            choice,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Other("No more responses".to_string())))
    }
}

/// Two-table store answering a single known query.
pub(crate) struct FakeStore {
    tables: Vec<(&'static str, &'static str)>,
    pub schema_requests: Mutex<Vec<Vec<String>>>,
    pub executed: Mutex<Vec<String>>,
}

impl FakeStore {
    pub const TOP_AGENT_SQL: &'static str = "SELECT e.FirstName, e.LastName, SUM(i.Total) AS TotalSales \
         FROM Employee e JOIN Customer c ON c.SupportRepId = e.EmployeeId \
         JOIN Invoice i ON i.CustomerId = c.CustomerId \
         WHERE strftime('%Y', i.InvoiceDate) = '2009' \
         GROUP BY e.EmployeeId ORDER BY TotalSales DESC LIMIT 1;";

    pub fn chinook() -> Self {
        Self {
            tables: vec![
                (
                    "Employee",
                    "CREATE TABLE \"Employee\" (\"EmployeeId\" INTEGER NOT NULL, \"LastName\" NVARCHAR(20), \"FirstName\" NVARCHAR(20))",
                ),
                (
                    "Invoice",
                    "CREATE TABLE \"Invoice\" (\"InvoiceId\" INTEGER NOT NULL, \"CustomerId\" INTEGER, \"InvoiceDate\" DATETIME, \"Total\" NUMERIC(10,2))",
                ),
            ],
            schema_requests: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RelationalStore for FakeStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.tables.iter().map(|(n, _)| n.to_string()).collect())
    }

    async fn schema(&self, table_names: &[String]) -> Result<String, StoreError> {
        self.schema_requests.lock().unwrap().push(table_names.to_vec());
        let missing: Vec<String> = table_names
            .iter()
            .filter(|n| !self.tables.iter().any(|(t, _)| t == n))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::UnknownTables(missing));
        }
        Ok(table_names
            .iter()
            .filter_map(|n| self.tables.iter().find(|(t, _)| t == n))
            .map(|(_, ddl)| ddl.to_string())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    async fn execute(&self, query: &str) -> Result<QueryRows, StoreError> {
        self.executed.lock().unwrap().push(query.to_string());
        if query == Self::TOP_AGENT_SQL {
            return Ok(QueryRows::new(
                vec!["FirstName".into(), "LastName".into(), "TotalSales".into()],
                vec![vec![
                    SqlValue::Text("Jane".into()),
                    SqlValue::Text("Peacock".into()),
                    SqlValue::Real(221.92),
                ]],
            ));
        }
        let table = query
            .split_whitespace()
            .skip_while(|w| !w.eq_ignore_ascii_case("from"))
            .nth(1)
            .unwrap_or("?")
            .trim_end_matches(';');
        Err(StoreError::Query(format!("no such table: {}", table)))
    }
}

/// An assistant request with a single invocation.
pub(crate) fn request(id: &str, tool: &str, arg: (&str, &str)) -> Message {
    Message::tool_request(vec![ToolInvocation::new(id, tool).with_arg(arg.0, arg.1)])
}

//! Prompt templates for the SQL question-answering flow

use crate::sql::Dialect;

/// Default number of rows a query should return unless the user asks otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Templates for each model-driven step of the orchestration graph.
///
/// All three are pure functions of the store's dialect.
pub struct SqlPromptTemplate;

impl SqlPromptTemplate {
    /// General behaviour prompt used by the ReAct agent.
    pub fn system(dialect: &Dialect, top_k: usize) -> String {
        format!(
            r#"You are an agent designed to interact with a SQL database.
Given an input question, create a syntactically correct {dialect} query to run,
then look at the results of the query and return the answer. Unless the user
specifies a specific number of examples they wish to obtain, always limit your
query to at most {top_k} results.

You can order the results by a relevant column to return the most interesting
examples in the database. Never query for all the columns from a specific table,
only ask for the relevant columns given the question.

You MUST double check your query before executing it. If you get an error while
executing a query, rewrite the query and try again.

DO NOT make any DML statements (INSERT, UPDATE, DELETE, DROP etc.) to the
database.

To start you should ALWAYS look at the tables in the database to see what you
can query. Do NOT skip this step.

Then you should query the schema of the most relevant tables."#,
            dialect = dialect,
            top_k = top_k,
        )
    }

    /// Prompt prefixed to every query generation request.
    pub fn generate_query(dialect: &Dialect, top_k: usize) -> String {
        format!(
            r#"You are an agent designed to interact with a SQL database.
Given an input question, create a syntactically correct {dialect} query to run,
then look at the results of the query and return the answer. Unless the user
specifies a specific number of examples they wish to obtain, always limit your
query to at most {top_k} results.

You can order the results by a relevant column to return the most interesting
examples in the database. Never query for all the columns from a specific table,
only ask for the relevant columns given the question.

When you need data, call the run_query tool exactly once with a single
syntactically valid statement. When the results already answer the question,
reply with the answer in plain text and do not call any tool.

DO NOT make any DML statements (INSERT, UPDATE, DELETE, DROP etc.) to the
database."#,
            dialect = dialect,
            top_k = top_k,
        )
    }

    /// Prompt for reviewing a draft statement before it is executed.
    pub fn check_query(dialect: &Dialect) -> String {
        format!(
            r#"You are a SQL expert with a strong attention to detail.
Double check the {dialect} query for common mistakes, including:
- Using NOT IN with NULL values
- Using UNION when UNION ALL should have been used
- Using BETWEEN for exclusive ranges
- Data type mismatch in predicates
- Properly quoting identifiers
- Using the correct number of arguments for functions
- Casting to the correct data type
- Using the proper columns for joins

If there are any of the above mistakes, rewrite the query. If there are no
mistakes, just reproduce the original query.

You will call the run_query tool to execute the query after running this check."#,
            dialect = dialect,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_mention_dialect() {
        let dialect = Dialect::Sqlite;
        assert!(SqlPromptTemplate::system(&dialect, 5).contains("correct sqlite query"));
        assert!(SqlPromptTemplate::generate_query(&dialect, 5).contains("correct sqlite query"));
        assert!(SqlPromptTemplate::check_query(&dialect).contains("Double check the sqlite query"));
    }

    #[test]
    fn test_top_k_is_interpolated() {
        let prompt = SqlPromptTemplate::generate_query(&Dialect::Postgresql, 7);
        assert!(prompt.contains("at most 7 results"));
        assert!(prompt.contains("postgresql"));
    }

    #[test]
    fn test_prompts_forbid_dml_and_name_tool() {
        let generate = SqlPromptTemplate::generate_query(&Dialect::Sqlite, DEFAULT_TOP_K);
        assert!(generate.contains("DO NOT make any DML statements"));
        assert!(generate.contains("run_query"));
        assert!(SqlPromptTemplate::check_query(&Dialect::Sqlite).contains("run_query"));
        assert!(SqlPromptTemplate::system(&Dialect::Sqlite, DEFAULT_TOP_K)
            .contains("ALWAYS look at the tables"));
    }
}

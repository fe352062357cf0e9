//! SQLite-backed relational store.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params};
use sql_agent_application::{RelationalStore, StoreError};
use sql_agent_domain::{Dialect, QueryRows, SqlValue};
use tracing::debug;

/// Sample cells longer than this are cut in schema descriptions.
const SAMPLE_CELL_CHARS: usize = 100;

/// Which tables are visible and how they are described.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    /// Rows shown under each table's DDL (0 = none).
    pub sample_rows: usize,
    /// When non-empty, only these tables are visible.
    pub include_tables: Vec<String>,
    pub ignore_tables: Vec<String>,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            sample_rows: 3,
            include_tables: Vec::new(),
            ignore_tables: Vec::new(),
        }
    }
}

#[derive(Clone)]
enum Source {
    /// A connection is opened per call.
    File(PathBuf),
    /// One connection shared by every call (in-memory databases).
    Shared(Arc<Mutex<Connection>>),
}

/// SQLite store. Blocking rusqlite work runs on `spawn_blocking`.
///
/// **Interaction**: used as `Arc<dyn RelationalStore>` by the SQL tool set.
#[derive(Clone)]
pub struct SqliteStore {
    source: Source,
    options: SqliteOptions,
}

impl SqliteStore {
    /// Open an existing database file. The file is never created.
    pub fn open(path: impl AsRef<Path>, options: SqliteOptions) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        open_file(&path)?;
        Ok(Self {
            source: Source::File(path),
            options,
        })
    }

    /// Wrap an already open connection (e.g. `Connection::open_in_memory()`).
    pub fn from_connection(conn: Connection, options: SqliteOptions) -> Self {
        Self {
            source: Source::Shared(Arc::new(Mutex::new(conn))),
            options,
        }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let source = self.source.clone();
        tokio::task::spawn_blocking(move || match source {
            Source::File(path) => f(&open_file(&path)?),
            Source::Shared(conn) => {
                let conn = conn
                    .lock()
                    .map_err(|_| StoreError::Internal("connection lock poisoned".to_string()))?;
                f(&conn)
            }
        })
        .await
        .map_err(|e| StoreError::Internal(e.to_string()))?
    }

    async fn usable_tables(&self) -> Result<Vec<String>, StoreError> {
        let options = self.options.clone();
        self.with_conn(move |conn| {
            let all = table_names(conn)?;
            Ok(filter_tables(all, &options))
        })
        .await
    }
}

fn open_file(path: &Path) -> Result<Connection, StoreError> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| StoreError::Connection(format!("{}: {}", path.display(), e)))
}

fn internal(e: rusqlite::Error) -> StoreError {
    StoreError::Internal(e.to_string())
}

fn table_names(conn: &Connection) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .map_err(internal)?;
    let rows = stmt.query_map([], |row| row.get(0)).map_err(internal)?;
    rows.collect::<Result<Vec<String>, _>>().map_err(internal)
}

fn filter_tables(all: Vec<String>, options: &SqliteOptions) -> Vec<String> {
    let set: BTreeSet<String> = all
        .into_iter()
        .filter(|t| options.include_tables.is_empty() || options.include_tables.contains(t))
        .filter(|t| !options.ignore_tables.contains(t))
        .collect();
    set.into_iter().collect()
}

fn describe_table(conn: &Connection, table: &str, sample_rows: usize) -> Result<String, StoreError> {
    let ddl: String = conn
        .query_row(
            "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .map_err(internal)?;
    let mut out = ddl.trim_end().trim_end_matches(';').to_string();

    if sample_rows > 0 {
        let sql = format!("SELECT * FROM \"{}\" LIMIT {}", table.replace('"', "\"\""), sample_rows);
        let rows = select(conn, &sql).map_err(internal)?;
        let sample: Vec<String> = rows
            .rows
            .iter()
            .map(|row| row.iter().map(sample_cell).collect::<Vec<_>>().join("\t"))
            .collect();
        out.push_str(&format!(
            "\n\n/*\n{} rows from {} table:\n{}\n{}\n*/",
            sample_rows,
            table,
            rows.columns.join("\t"),
            sample.join("\n")
        ));
    }
    Ok(out)
}

fn sample_cell(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "None".to_string(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(f) => f.to_string(),
        SqlValue::Text(s) => s.chars().take(SAMPLE_CELL_CHARS).collect(),
        SqlValue::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

/// The engine's own error text, without rusqlite's wrapping.
fn engine_message(e: rusqlite::Error) -> String {
    match e {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg,
        other => other.to_string(),
    }
}

fn to_sql_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Integer(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
    }
}

/// Run one statement. Statements without result columns run for effect and
/// return no rows.
fn select(conn: &Connection, sql: &str) -> Result<QueryRows, rusqlite::Error> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    if width == 0 {
        stmt.execute([])?;
        return Ok(QueryRows::default());
    }

    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(to_sql_value(row.get_ref(i)?));
        }
        out.push(cells);
    }
    Ok(QueryRows::new(columns, out))
}

#[async_trait]
impl RelationalStore for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn list_tables(&self) -> Result<Vec<String>, StoreError> {
        self.usable_tables().await
    }

    async fn schema(&self, table_names: &[String]) -> Result<String, StoreError> {
        let usable = self.usable_tables().await?;
        let mut requested: Vec<String> = Vec::new();
        for name in table_names {
            if !requested.contains(name) {
                requested.push(name.clone());
            }
        }

        let missing: Vec<String> = requested
            .iter()
            .filter(|n| !usable.contains(n))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::UnknownTables(missing));
        }

        let sample_rows = self.options.sample_rows;
        self.with_conn(move |conn| {
            let described = requested
                .iter()
                .map(|t| describe_table(conn, t, sample_rows))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(described.join("\n\n"))
        })
        .await
    }

    async fn execute(&self, query: &str) -> Result<QueryRows, StoreError> {
        let sql = query.trim().to_string();
        debug!(query = %sql, "Executing statement");
        self.with_conn(move |conn| select(conn, &sql).map_err(|e| StoreError::Query(engine_message(e))))
            .await
    }
}

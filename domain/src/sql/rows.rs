//! Tabular query results

use serde::{Deserialize, Serialize};

/// Text cells longer than this are cut when rendered for the model.
pub const MAX_CELL_CHARS: usize = 300;

/// A single cell value returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Python-literal style rendering (`None`, `42`, `1.0`, `'text'`).
    pub fn render(&self) -> String {
        match self {
            SqlValue::Null => "None".to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Real(f) => {
                if f.is_finite() && f.fract() == 0.0 {
                    format!("{:.1}", f)
                } else {
                    f.to_string()
                }
            }
            SqlValue::Text(s) => quote(&truncate_chars(s, MAX_CELL_CHARS)),
            SqlValue::Blob(b) => format!("<blob {} bytes>", b.len()),
        }
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max).collect();
    cut.push_str("...");
    cut
}

fn quote(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('\n', "\\n");
    if escaped.contains('\'') && !escaped.contains('"') {
        format!("\"{}\"", escaped)
    } else {
        format!("'{}'", escaped.replace('\'', "\\'"))
    }
}

/// Rows returned by a query, with their column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl QueryRows {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a list of tuples, e.g. `[(1, 'Jane Peacock', 833.04)]`.
    ///
    /// An empty result renders as the empty string.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let tuples: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row.iter().map(SqlValue::render).collect();
                if cells.len() == 1 {
                    format!("({},)", cells[0])
                } else {
                    format!("({})", cells.join(", "))
                }
            })
            .collect();
        format!("[{}]", tuples.join(", "))
    }
}

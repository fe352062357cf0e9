//! Database URL parsing.

use sql_agent_application::StoreError;
use std::path::PathBuf;

/// File path of a SQLite connection URL.
///
/// Accepts the SQLAlchemy forms `sqlite:///relative.db` and
/// `sqlite:////absolute/path.db`, the shorter `sqlite://path.db`, and a
/// plain file path. In-memory databases and other engines are rejected.
pub fn sqlite_path(url: &str) -> Result<PathBuf, StoreError> {
    let url = url.trim();
    let path = if let Some(rest) = url.strip_prefix("sqlite:///") {
        rest
    } else if let Some(rest) = url.strip_prefix("sqlite://") {
        rest
    } else if let Some((scheme, _)) = url.split_once("://") {
        return Err(StoreError::Connection(format!(
            "unsupported database scheme '{}', only sqlite is supported",
            scheme
        )));
    } else {
        url
    };

    if path.is_empty() || path == ":memory:" {
        return Err(StoreError::Connection(format!(
            "'{}' does not name a database file",
            url
        )));
    }
    Ok(PathBuf::from(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlalchemy_relative_form() {
        assert_eq!(sqlite_path("sqlite:///Chinook.db").unwrap(), PathBuf::from("Chinook.db"));
    }

    #[test]
    fn test_sqlalchemy_absolute_form() {
        assert_eq!(
            sqlite_path("sqlite:////var/data/music.db").unwrap(),
            PathBuf::from("/var/data/music.db")
        );
    }

    #[test]
    fn test_short_form_and_plain_path() {
        assert_eq!(sqlite_path("sqlite://music.db").unwrap(), PathBuf::from("music.db"));
        assert_eq!(sqlite_path(" ./music.db ").unwrap(), PathBuf::from("./music.db"));
    }

    #[test]
    fn test_rejects_memory_and_other_engines() {
        assert!(sqlite_path("sqlite:///:memory:").is_err());
        assert!(sqlite_path("").is_err());
        let err = sqlite_path("postgresql://localhost/chinook").unwrap_err();
        assert!(err.to_string().contains("postgresql"));
    }
}

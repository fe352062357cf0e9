//! SQL dialect value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The SQL variant spoken by the relational store.
///
/// Only used to tailor prompt wording; statements are never translated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sqlite,
    Postgresql,
    Mysql,
    /// Any other engine, by name.
    Other(String),
}

impl Dialect {
    pub fn as_str(&self) -> &str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgresql => "postgresql",
            Dialect::Mysql => "mysql",
            Dialect::Other(name) => name,
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Sqlite
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Dialect {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "" => Err(DomainError::InvalidDialect(s.to_string())),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" => Ok(Dialect::Postgresql),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            _ => Ok(Dialect::Other(name)),
        }
    }
}

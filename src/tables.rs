//! Live table enumeration.
//!
//! Statements that interpolate a table name only accept a [`TableName`],
//! and the only way to get one is to read it out of the database catalog.

use std::fmt;

use crate::db::{DbConnection, Dialect};
use crate::error::{DbError, Result};

const MYSQL_LIST_TABLES: &str = "SHOW TABLES";

// sqlite_sequence and friends are engine bookkeeping, not schema tables.
const SQLITE_LIST_TABLES: &str =
    "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' ORDER BY name";

/// A table name as reported by the server's own catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    fn from_catalog(name: &str) -> Result<Self> {
        if name.is_empty() || name.chars().any(char::is_control) {
            return Err(DbError::InvalidTableName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn quoted(&self, dialect: Dialect) -> String {
        dialect.quote_identifier(&self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Every table currently in the connected database, in catalog order.
pub async fn list_tables(conn: &mut DbConnection) -> Result<Vec<TableName>> {
    let sql = match conn.dialect() {
        Dialect::MySql => MYSQL_LIST_TABLES,
        Dialect::Sqlite => SQLITE_LIST_TABLES,
    };

    let rows = conn.fetch_all(sql, &[]).await?;
    rows.iter()
        .map(|row| {
            let value = row.first().ok_or_else(|| DbError::InvalidTableName(String::new()))?;
            let name = value
                .as_text()
                .ok_or_else(|| DbError::InvalidTableName(value.to_string()))?;
            TableName::from_catalog(name)
        })
        .collect()
}

pub async fn list_table_names(conn: &mut DbConnection) -> Result<Vec<String>> {
    let tables = list_tables(conn).await?;
    Ok(tables.into_iter().map(|t| t.0).collect())
}

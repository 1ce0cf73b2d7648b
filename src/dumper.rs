//! Full-table reads for inspecting a development database.
//!
//! Each table is read into memory in one go. That is fine for the small
//! fixtures this tool is pointed at and nowhere else.

use std::fmt;

use crate::db::DbConnection;
use crate::error::Result;
use crate::row::Row;
use crate::tables::{self, TableName};

pub const NO_DATA: &str = "No data in this table";

/// All rows of one table, as fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDump {
    pub table: TableName,
    pub rows: Vec<Row>,
}

impl TableDump {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names taken from the first row; empty when there are no rows.
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.columns().collect())
            .unwrap_or_default()
    }

    /// Renders the table, using `empty_note` in place of rows when there are none.
    pub fn render(&self, empty_note: &str) -> String {
        let mut out = format!("Data from table: {}\n", self.table);
        match self.rows.first() {
            None => {
                out.push_str(empty_note);
                out.push('\n');
            }
            Some(first) => {
                out.push_str(&first.render_header());
                out.push('\n');
                for row in &self.rows {
                    out.push_str(&row.render_values());
                    out.push('\n');
                }
            }
        }
        out
    }
}

impl fmt::Display for TableDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(NO_DATA))
    }
}

pub async fn dump_table(conn: &mut DbConnection, table: &TableName) -> Result<TableDump> {
    let sql = format!("SELECT * FROM {}", table.quoted(conn.dialect()));
    let rows = conn.fetch_all(&sql, &[]).await?;
    tracing::debug!(%table, rows = rows.len(), "dumped table");
    Ok(TableDump {
        table: table.clone(),
        rows,
    })
}

pub async fn dump_tables(conn: &mut DbConnection, tables: &[TableName]) -> Result<Vec<TableDump>> {
    let mut dumps = Vec::with_capacity(tables.len());
    for table in tables {
        dumps.push(dump_table(conn, table).await?);
    }
    Ok(dumps)
}

/// Dumps every table currently in the database.
pub async fn dump_all(conn: &mut DbConnection) -> Result<Vec<TableDump>> {
    let tables = tables::list_tables(conn).await?;
    dump_tables(conn, &tables).await
}

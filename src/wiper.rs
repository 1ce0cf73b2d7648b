//! Destructive reset of every table, for test environments.
//!
//! Foreign key enforcement is switched off for the session while tables are
//! emptied so they can go in any order, and switched back on even when a
//! truncation fails.

use crate::db::{DbConnection, Dialect};
use crate::dumper::{self, TableDump};
use crate::error::Result;
use crate::row::Value;
use crate::tables::{self, TableName};

pub const VERIFIED_EMPTY: &str = "No data in this table (successfully deleted)";

#[derive(Debug, Clone)]
pub struct WipeReport {
    pub cleared: Vec<TableName>,
    /// A fresh dump of every cleared table, taken after the commit.
    pub verification: Vec<TableDump>,
}

impl WipeReport {
    pub fn all_empty(&self) -> bool {
        self.verification.iter().all(TableDump::is_empty)
    }
}

pub async fn wipe_all(conn: &mut DbConnection) -> Result<WipeReport> {
    let tables = tables::list_tables(conn).await?;

    conn.set_foreign_key_checks(false).await?;
    let truncated = truncate_each(conn, &tables).await;
    let restored = conn.set_foreign_key_checks(true).await;

    match (truncated, restored) {
        (Err(e), Err(restore_err)) => {
            tracing::warn!(error = %restore_err, "could not re-enable foreign key checks");
            return Err(e);
        }
        (Err(e), Ok(())) | (Ok(()), Err(e)) => return Err(e),
        (Ok(()), Ok(())) => {}
    }

    conn.commit().await?;
    tracing::info!(tables = tables.len(), "all data deleted, verifying");

    let verification = dumper::dump_tables(conn, &tables).await?;
    Ok(WipeReport {
        cleared: tables,
        verification,
    })
}

async fn truncate_each(conn: &mut DbConnection, tables: &[TableName]) -> Result<()> {
    for table in tables {
        tracing::info!(%table, "deleting data from table");
        truncate(conn, table).await?;
    }
    Ok(())
}

/// Empties one table and restarts its auto-increment counter.
pub async fn truncate(conn: &mut DbConnection, table: &TableName) -> Result<()> {
    let dialect = conn.dialect();
    let quoted = table.quoted(dialect);
    match dialect {
        Dialect::MySql => {
            conn.execute(&format!("TRUNCATE TABLE {quoted}"), &[]).await?;
        }
        Dialect::Sqlite => {
            conn.execute(&format!("DELETE FROM {quoted}"), &[]).await?;
            if has_sqlite_sequence(conn).await? {
                conn.execute(
                    "DELETE FROM sqlite_sequence WHERE name = ?",
                    &[Value::from(table.as_str())],
                )
                .await?;
            }
        }
    }
    Ok(())
}

async fn has_sqlite_sequence(conn: &mut DbConnection) -> Result<bool> {
    let rows = conn
        .fetch_all(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
            &[],
        )
        .await?;
    Ok(!rows.is_empty())
}

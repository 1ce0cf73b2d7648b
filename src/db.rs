use sqlx::mysql::MySqlConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;

use crate::config::{ConnectTarget, DbConfig};
use crate::error::Result;
use crate::row::{self, Row, Value};

/// SQL flavour spoken by the connected server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl Dialect {
    /// Quotes an identifier, doubling any embedded quote character.
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", name.replace('`', "``")),
            Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    pub(crate) fn foreign_key_checks_sql(self, enabled: bool) -> &'static str {
        match (self, enabled) {
            (Dialect::MySql, true) => "SET FOREIGN_KEY_CHECKS = 1",
            (Dialect::MySql, false) => "SET FOREIGN_KEY_CHECKS = 0",
            (Dialect::Sqlite, true) => "PRAGMA foreign_keys = ON",
            (Dialect::Sqlite, false) => "PRAGMA foreign_keys = OFF",
        }
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Executed {
    pub rows_affected: u64,
    pub last_insert_id: u64,
}

/// A single open connection. Every tool holds exactly one for its whole run.
#[derive(Debug)]
pub enum DbConnection {
    MySql(MySqlConnection),
    Sqlite(SqliteConnection),
}

impl DbConnection {
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let target = config.target()?;
        tracing::info!(database = %config.describe(), "connecting");

        let conn = match target {
            ConnectTarget::MySql(options) => {
                Self::MySql(MySqlConnection::connect_with(&options).await?)
            }
            ConnectTarget::Sqlite(options) => {
                Self::Sqlite(SqliteConnection::connect_with(&options).await?)
            }
        };
        Ok(conn)
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Self::MySql(_) => Dialect::MySql,
            Self::Sqlite(_) => Dialect::Sqlite,
        }
    }

    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<Executed> {
        tracing::debug!(sql, params = params.len(), "execute");
        let executed = match self {
            Self::MySql(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query(sql), |query, value| row::bind_mysql(query, value));
                let done = query.execute(&mut *conn).await?;
                Executed {
                    rows_affected: done.rows_affected(),
                    last_insert_id: done.last_insert_id(),
                }
            }
            Self::Sqlite(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query(sql), |query, value| row::bind_sqlite(query, value));
                let done = query.execute(&mut *conn).await?;
                Executed {
                    rows_affected: done.rows_affected(),
                    last_insert_id: u64::try_from(done.last_insert_rowid()).unwrap_or_default(),
                }
            }
        };
        Ok(executed)
    }

    /// Runs a query and reads the whole result set into memory.
    pub async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        tracing::debug!(sql, params = params.len(), "fetch_all");
        let rows = match self {
            Self::MySql(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query(sql), |query, value| row::bind_mysql(query, value));
                query
                    .fetch_all(&mut *conn)
                    .await?
                    .iter()
                    .map(row::from_mysql)
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
            Self::Sqlite(conn) => {
                let query = params
                    .iter()
                    .fold(sqlx::query(sql), |query, value| row::bind_sqlite(query, value));
                query
                    .fetch_all(&mut *conn)
                    .await?
                    .iter()
                    .map(row::from_sqlite)
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(rows)
    }

    pub async fn commit(&mut self) -> Result<()> {
        match self.dialect() {
            Dialect::MySql => {
                self.execute("COMMIT", &[]).await?;
            }
            // Autocommit: nothing is pending outside an explicit transaction.
            Dialect::Sqlite => {}
        }
        Ok(())
    }

    /// Toggles foreign key enforcement for this session.
    pub async fn set_foreign_key_checks(&mut self, enabled: bool) -> Result<()> {
        let sql = self.dialect().foreign_key_checks_sql(enabled);
        self.execute(sql, &[]).await?;
        Ok(())
    }

    pub async fn is_connected(&mut self) -> bool {
        let ping = match self {
            Self::MySql(conn) => conn.ping().await,
            Self::Sqlite(conn) => conn.ping().await,
        };
        ping.is_ok()
    }

    pub async fn close(self) -> Result<()> {
        match self {
            Self::MySql(conn) => conn.close().await?,
            Self::Sqlite(conn) => conn.close().await?,
        }
        Ok(())
    }

    /// Releases the connection, logging rather than returning close errors
    /// so the caller's own outcome is what gets reported.
    pub async fn shutdown(mut self) {
        if !self.is_connected().await {
            tracing::warn!("connection already lost, dropping it");
            return;
        }
        match self.close().await {
            Ok(()) => tracing::info!("connection is closed"),
            Err(e) => tracing::warn!(error = %e, "failed to close connection cleanly"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory() -> DbConnection {
        let config = DbConfig::default().with_url("sqlite::memory:");
        DbConnection::connect(&config).await.unwrap()
    }

    #[test]
    fn identifiers_are_quoted_per_dialect() {
        assert_eq!(Dialect::MySql.quote_identifier("users"), "`users`");
        assert_eq!(Dialect::MySql.quote_identifier("we`ird"), "`we``ird`");
        assert_eq!(Dialect::Sqlite.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::Sqlite.quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[tokio::test]
    async fn execute_reports_insert_id_and_fetch_keeps_column_order() {
        let mut conn = memory().await;
        assert_eq!(conn.dialect(), Dialect::Sqlite);

        conn.execute(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT, weight REAL)",
            &[],
        )
        .await
        .unwrap();
        let done = conn
            .execute(
                "INSERT INTO notes (body, weight) VALUES (?, ?)",
                &[Value::from("hello"), Value::Null],
            )
            .await
            .unwrap();
        assert_eq!(done.rows_affected, 1);
        assert_eq!(done.last_insert_id, 1);

        let rows = conn.fetch_all("SELECT * FROM notes", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), ["id", "body", "weight"]);
        assert_eq!(rows[0].render_values(), "1, hello, NULL");

        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_key_toggle_is_visible() {
        let mut conn = memory().await;

        conn.set_foreign_key_checks(false).await.unwrap();
        let rows = conn.fetch_all("PRAGMA foreign_keys", &[]).await.unwrap();
        assert_eq!(rows[0].first(), Some(&Value::Int(0)));

        conn.set_foreign_key_checks(true).await.unwrap();
        let rows = conn.fetch_all("PRAGMA foreign_keys", &[]).await.unwrap();
        assert_eq!(rows[0].first(), Some(&Value::Int(1)));
    }

    #[tokio::test]
    async fn commit_outside_transaction_is_harmless() {
        let mut conn = memory().await;
        conn.commit().await.unwrap();
        assert!(conn.is_connected().await);
        conn.shutdown().await;
    }

    #[tokio::test]
    async fn connect_without_database_name_fails() {
        let config = DbConfig {
            host: Some("localhost".into()),
            user: Some("root".into()),
            password: Some(String::new()),
            ..DbConfig::default()
        };
        let err = DbConnection::connect(&config).await.unwrap_err();
        assert!(matches!(err, crate::error::DbError::MissingSetting(_)));
    }
}

//! Table definitions for the fitting database.
//!
//! Every statement is `IF NOT EXISTS`, so applying the schema repeatedly is
//! safe. `measurements.user_id` refers to `users.id` but is deliberately left
//! without a foreign key constraint.

use crate::db::{DbConnection, Dialect};
use crate::error::Result;

pub const USERS_TABLE: &str = "users";
pub const MEASUREMENTS_TABLE: &str = "measurements";

/// Optional body measurements, each DECIMAL(5,2), in column order.
pub const MEASUREMENT_FIELDS: [&str; 10] = [
    "height",
    "shoulder_width",
    "arm_length",
    "neck",
    "wrist",
    "chest",
    "waist",
    "hip",
    "thigh",
    "ankle",
];

const MYSQL_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INT NOT NULL AUTO_INCREMENT,
        full_name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (id),
        UNIQUE KEY (email)
    )
"#;

const MYSQL_MEASUREMENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS measurements (
        id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT,
        user_id INT DEFAULT NULL,
        height DECIMAL(5,2) DEFAULT NULL,
        shoulder_width DECIMAL(5,2) DEFAULT NULL,
        arm_length DECIMAL(5,2) DEFAULT NULL,
        neck DECIMAL(5,2) DEFAULT NULL,
        wrist DECIMAL(5,2) DEFAULT NULL,
        chest DECIMAL(5,2) DEFAULT NULL,
        waist DECIMAL(5,2) DEFAULT NULL,
        hip DECIMAL(5,2) DEFAULT NULL,
        thigh DECIMAL(5,2) DEFAULT NULL,
        ankle DECIMAL(5,2) DEFAULT NULL,
        created_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
        PRIMARY KEY (id)
    )
"#;

const SQLITE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    )
"#;

// Measurements are kept as fixed two-decimal text; a REAL column would turn
// 180.50 into 180.5. The CHECKs hold them to DECIMAL(5,2)'s range
// (a NULL passes, since abs(NULL) is NULL).
const SQLITE_MEASUREMENTS: &str = r#"
    CREATE TABLE IF NOT EXISTS measurements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER DEFAULT NULL,
        height TEXT DEFAULT NULL CHECK (abs(height) < 1000),
        shoulder_width TEXT DEFAULT NULL CHECK (abs(shoulder_width) < 1000),
        arm_length TEXT DEFAULT NULL CHECK (abs(arm_length) < 1000),
        neck TEXT DEFAULT NULL CHECK (abs(neck) < 1000),
        wrist TEXT DEFAULT NULL CHECK (abs(wrist) < 1000),
        chest TEXT DEFAULT NULL CHECK (abs(chest) < 1000),
        waist TEXT DEFAULT NULL CHECK (abs(waist) < 1000),
        hip TEXT DEFAULT NULL CHECK (abs(hip) < 1000),
        thigh TEXT DEFAULT NULL CHECK (abs(thigh) < 1000),
        ankle TEXT DEFAULT NULL CHECK (abs(ankle) < 1000),
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    )
"#;

const SQLITE_MEASUREMENTS_TOUCH: &str = r#"
    CREATE TRIGGER IF NOT EXISTS measurements_touch_updated_at
    AFTER UPDATE ON measurements
    FOR EACH ROW WHEN NEW.updated_at IS OLD.updated_at
    BEGIN
        UPDATE measurements SET updated_at = CURRENT_TIMESTAMP WHERE id = NEW.id;
    END
"#;

pub fn statements(dialect: Dialect) -> &'static [&'static str] {
    match dialect {
        Dialect::MySql => &[MYSQL_USERS, MYSQL_MEASUREMENTS],
        Dialect::Sqlite => &[SQLITE_USERS, SQLITE_MEASUREMENTS, SQLITE_MEASUREMENTS_TOUCH],
    }
}

/// Creates any missing tables.
pub async fn apply(conn: &mut DbConnection) -> Result<()> {
    for statement in statements(conn.dialect()) {
        conn.execute(statement, &[]).await?;
    }
    tracing::info!("database tables created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::row::Value;
    use crate::tables;

    async fn memory() -> DbConnection {
        let config = DbConfig::default().with_url("sqlite::memory:");
        DbConnection::connect(&config).await.unwrap()
    }

    #[tokio::test]
    async fn creates_exactly_users_and_measurements() {
        let mut conn = memory().await;
        apply(&mut conn).await.unwrap();

        let names = tables::list_table_names(&mut conn).await.unwrap();
        assert_eq!(names, [MEASUREMENTS_TABLE, USERS_TABLE]);
    }

    #[tokio::test]
    async fn applying_twice_changes_nothing() {
        let mut conn = memory().await;
        apply(&mut conn).await.unwrap();
        let once = tables::list_table_names(&mut conn).await.unwrap();

        apply(&mut conn).await.unwrap();
        let twice = tables::list_table_names(&mut conn).await.unwrap();
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn email_must_be_unique() {
        let mut conn = memory().await;
        apply(&mut conn).await.unwrap();

        let insert = "INSERT INTO users (full_name, email, password) VALUES (?, ?, ?)";
        let params: [Value; 3] = ["Asha".into(), "asha@example.com".into(), "pw".into()];
        conn.execute(insert, &params).await.unwrap();
        assert!(conn.execute(insert, &params).await.is_err());
    }

    #[tokio::test]
    async fn measurements_accept_an_unknown_user() {
        let mut conn = memory().await;
        apply(&mut conn).await.unwrap();

        conn.execute("INSERT INTO measurements (user_id) VALUES (?)", &[Value::UInt(42)])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn updated_at_refreshes_on_update() {
        let mut conn = memory().await;
        apply(&mut conn).await.unwrap();

        conn.execute(
            "INSERT INTO measurements (user_id, updated_at) VALUES (?, ?)",
            &[Value::UInt(1), Value::from("2000-01-01 00:00:00")],
        )
        .await
        .unwrap();
        conn.execute("UPDATE measurements SET height = '170.00'", &[])
            .await
            .unwrap();

        let rows = conn
            .fetch_all("SELECT height, updated_at FROM measurements", &[])
            .await
            .unwrap();
        assert_eq!(rows[0].get("height"), Some(&Value::from("170.00")));
        assert_ne!(rows[0].get("updated_at"), Some(&Value::from("2000-01-01 00:00:00")));
        assert_ne!(rows[0].get("updated_at"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn sqlite_measurements_stay_within_five_digits() {
        let mut conn = memory().await;
        apply(&mut conn).await.unwrap();

        let insert = "INSERT INTO measurements (user_id, height) VALUES (1, ?)";
        assert!(conn.execute(insert, &[Value::from("1234.50")]).await.is_err());
        assert!(conn.execute(insert, &[Value::from("-1000.00")]).await.is_err());
        conn.execute(insert, &[Value::from("999.99")]).await.unwrap();
        conn.execute(insert, &[Value::Null]).await.unwrap();
    }

    #[test]
    fn mysql_measurements_are_fixed_point() {
        let ddl = statements(Dialect::MySql).join("\n");
        for field in MEASUREMENT_FIELDS {
            assert!(ddl.contains(&format!("{field} DECIMAL(5,2) DEFAULT NULL")), "{field}");
        }
        assert!(ddl.contains("ON UPDATE CURRENT_TIMESTAMP"));
        assert!(statements(Dialect::MySql).iter().all(|s| s.contains("IF NOT EXISTS")));
    }
}

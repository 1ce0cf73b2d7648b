//! Writes for users and their measurements, used by the seeder.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::db::DbConnection;
use crate::error::Result;
use crate::row::Value;
use crate::schema::MEASUREMENT_FIELDS;

const MEASUREMENT_SCALE: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    /// Stored exactly as given.
    pub password: String,
}

/// Body measurements; `None` means not recorded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Measurements {
    pub height: Option<Decimal>,
    pub shoulder_width: Option<Decimal>,
    pub arm_length: Option<Decimal>,
    pub neck: Option<Decimal>,
    pub wrist: Option<Decimal>,
    pub chest: Option<Decimal>,
    pub waist: Option<Decimal>,
    pub hip: Option<Decimal>,
    pub thigh: Option<Decimal>,
    pub ankle: Option<Decimal>,
}

impl Measurements {
    /// Values in [`MEASUREMENT_FIELDS`] order, rescaled to two places.
    fn values(&self) -> [Value; 10] {
        [
            self.height,
            self.shoulder_width,
            self.arm_length,
            self.neck,
            self.wrist,
            self.chest,
            self.waist,
            self.hip,
            self.thigh,
            self.ankle,
        ]
        .map(|field| {
            Value::from(field.map(|mut d| {
                d.rescale(MEASUREMENT_SCALE);
                d
            }))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saved {
    Inserted,
    Updated,
}

/// Inserts a user and returns its new id.
pub async fn create_user(conn: &mut DbConnection, user: &NewUser) -> Result<u64> {
    let done = conn
        .execute(
            "INSERT INTO users (full_name, email, password) VALUES (?, ?, ?)",
            &[
                Value::from(user.full_name.as_str()),
                Value::from(user.email.as_str()),
                Value::from(user.password.as_str()),
            ],
        )
        .await?;
    tracing::debug!(email = %user.email, id = done.last_insert_id, "created user");
    Ok(done.last_insert_id)
}

pub async fn find_user_id(conn: &mut DbConnection, email: &str) -> Result<Option<u64>> {
    let rows = conn
        .fetch_all("SELECT id FROM users WHERE email = ?", &[Value::from(email)])
        .await?;
    Ok(rows.first().and_then(|row| row.first()).and_then(Value::as_u64))
}

/// Stores the user's measurements, replacing any previously saved set.
pub async fn save_measurements(
    conn: &mut DbConnection,
    user_id: u64,
    measurements: &Measurements,
) -> Result<Saved> {
    let existing = conn
        .fetch_all(
            "SELECT id FROM measurements WHERE user_id = ?",
            &[Value::from(user_id)],
        )
        .await?;

    let mut params = measurements.values().to_vec();
    params.push(Value::from(user_id));

    if existing.is_empty() {
        let columns = MEASUREMENT_FIELDS.join(", ");
        let sql = format!(
            "INSERT INTO measurements ({columns}, user_id) VALUES ({})",
            vec!["?"; MEASUREMENT_FIELDS.len() + 1].join(", ")
        );
        conn.execute(&sql, &params).await?;
        Ok(Saved::Inserted)
    } else {
        let assignments = MEASUREMENT_FIELDS
            .iter()
            .map(|field| format!("{field} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE measurements SET {assignments}, updated_at = CURRENT_TIMESTAMP WHERE user_id = ?"
        );
        conn.execute(&sql, &params).await?;
        Ok(Saved::Updated)
    }
}

//! Driver-independent row values.
//!
//! Rows fetched through [`crate::db::DbConnection`] are decoded column by
//! column from the driver's type information into [`Value`]s, keeping the
//! column order the driver returned.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use sqlx::mysql::{MySql, MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float32(f32),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::UInt(n) => write!(f, "{n}"),
            Value::Float32(x) => write!(f, "{x}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => f.write_str(s),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl From<Option<Decimal>> for Value {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Value::Null, Value::Decimal)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

/// One fetched record: column name to value, in driver order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new(fields: Vec<(String, Value)>) -> Self {
        Self { fields }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// The first column's value, for single-column catalog queries.
    pub fn first(&self) -> Option<&Value> {
        self.fields.first().map(|(_, value)| value)
    }

    pub fn render_header(&self) -> String {
        join_fields(self.columns().map(str::to_string))
    }

    pub fn render_values(&self) -> String {
        join_fields(self.values().map(Value::to_string))
    }
}

/// Joins with ", ", quoting any field that would otherwise split the line.
pub fn join_fields(fields: impl Iterator<Item = String>) -> String {
    fields.map(quote_field).collect::<Vec<_>>().join(", ")
}

fn quote_field(field: String) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

pub(crate) fn from_mysql(row: &MySqlRow) -> Result<Row, sqlx::Error> {
    let mut fields = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = mysql_value(row, idx, column.type_info().name())?;
        fields.push((column.name().to_string(), value));
    }
    Ok(Row::new(fields))
}

fn mysql_value(row: &MySqlRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOLEAN" => Value::Bool(row.try_get(idx)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => Value::Int(row.try_get(idx)?),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" => Value::UInt(row.try_get(idx)?),
        "DECIMAL" => Value::Decimal(row.try_get(idx)?),
        "FLOAT" => Value::Float32(row.try_get(idx)?),
        "DOUBLE" => Value::Float(row.try_get(idx)?),
        "YEAR" => Value::UInt(u64::from(row.try_get_unchecked::<u16, _>(idx)?)),
        "BIT" => Value::UInt(bit_value(&raw_bytes(row, idx)?)),
        // Zero dates ('0000-00-00 ...') have no chrono form; show them as stored.
        "TIMESTAMP" | "DATETIME" => match row.try_get(idx) {
            Ok(ts) => Value::Timestamp(ts),
            Err(_) => Value::Text(mysql_datetime_text(&raw_bytes(row, idx)?)),
        },
        "DATE" => match row.try_get(idx) {
            Ok(d) => Value::Date(d),
            Err(_) => Value::Text(mysql_date_text(&raw_bytes(row, idx)?)),
        },
        "TIME" => Value::Time(row.try_get(idx)?),
        "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            Value::Text(row.try_get(idx)?)
        }
        // BINARY, BLOB, JSON and friends: show whatever bytes came back.
        _ => Value::Bytes(row.try_get_unchecked(idx)?),
    };
    Ok(value)
}

fn raw_bytes(row: &MySqlRow, idx: usize) -> Result<Vec<u8>, sqlx::Error> {
    row.try_get_unchecked(idx)
}

/// BIT(n) arrives as big-endian bytes.
fn bit_value(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, &b| (acc << 8) | u64::from(b))
}

// Binary-protocol DATE/DATETIME: year (u16 LE), month, day, then optionally
// hour, minute, second. A zero date is sent with no payload at all.
fn mysql_date_parts(bytes: &[u8]) -> [u32; 6] {
    let mut parts = [0u32; 6];
    if let [lo, hi, rest @ ..] = bytes {
        parts[0] = u32::from(u16::from_le_bytes([*lo, *hi]));
        for (slot, &b) in parts[1..].iter_mut().zip(rest) {
            *slot = u32::from(b);
        }
    }
    parts
}

// Text-protocol results are already "YYYY-MM-DD...".
fn as_date_text(bytes: &[u8]) -> Option<String> {
    (bytes.get(4) == Some(&b'-')).then(|| String::from_utf8_lossy(bytes).into_owned())
}

fn mysql_datetime_text(bytes: &[u8]) -> String {
    if let Some(text) = as_date_text(bytes) {
        return text;
    }
    let [y, mo, d, h, mi, s] = mysql_date_parts(bytes);
    format!("{y:04}-{mo:02}-{d:02} {h:02}:{mi:02}:{s:02}")
}

fn mysql_date_text(bytes: &[u8]) -> String {
    if let Some(text) = as_date_text(bytes) {
        return text;
    }
    let [y, mo, d, ..] = mysql_date_parts(bytes);
    format!("{y:04}-{mo:02}-{d:02}")
}

pub(crate) fn from_sqlite(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut fields = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = sqlite_value(row, idx)?;
        fields.push((column.name().to_string(), value));
    }
    Ok(Row::new(fields))
}

// SQLite types are per value, so decode by the stored storage class rather
// than the declared column type.
fn sqlite_value(row: &SqliteRow, idx: usize) -> Result<Value, sqlx::Error> {
    let storage_class = {
        let raw = row.try_get_raw(idx)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_string()
    };

    let value = match storage_class.as_str() {
        "INTEGER" => Value::Int(row.try_get_unchecked(idx)?),
        "REAL" => Value::Float(row.try_get_unchecked(idx)?),
        "BLOB" => Value::Bytes(row.try_get_unchecked(idx)?),
        _ => Value::Text(row.try_get_unchecked(idx)?),
    };
    Ok(value)
}

pub(crate) fn bind_mysql<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: &Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(n) => query.bind(*n),
        Value::UInt(n) => query.bind(*n),
        Value::Float32(x) => query.bind(*x),
        Value::Float(x) => query.bind(*x),
        Value::Decimal(d) => query.bind(*d),
        Value::Text(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
        Value::Date(d) => query.bind(*d),
        Value::Time(t) => query.bind(*t),
        Value::Timestamp(ts) => query.bind(*ts),
    }
}

pub(crate) fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Int(n) => query.bind(*n),
        Value::UInt(n) => match i64::try_from(*n) {
            Ok(n) => query.bind(n),
            Err(_) => query.bind(n.to_string()),
        },
        Value::Float32(x) => query.bind(*x),
        Value::Float(x) => query.bind(*x),
        // No fixed-point type in SQLite; keep the exact decimal text.
        Value::Decimal(d) => query.bind(d.to_string()),
        Value::Text(s) => query.bind(s.clone()),
        Value::Bytes(b) => query.bind(b.clone()),
        Value::Date(d) => query.bind(*d),
        Value::Time(t) => query.bind(*t),
        Value::Timestamp(ts) => query.bind(ts.format(TIMESTAMP_FORMAT).to_string()),
    }
}

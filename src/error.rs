//! Error type shared by every database operation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

/// A failed database operation: bad connection settings, a rejected
/// identifier, or anything the driver reports.
#[derive(Error, Debug)]
pub enum DbError {
    /// A required connection setting was absent or empty.
    #[error("{0} is not set")]
    MissingSetting(&'static str),

    /// The database URL names a scheme we have no driver for.
    #[error("unsupported database url scheme in {0:?}")]
    UnsupportedUrl(String),

    /// A catalog entry that cannot be used as a table identifier.
    #[error("refusing to use {0:?} as a table name")]
    InvalidTableName(String),

    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
}

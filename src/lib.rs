//! Schema setup, inspection and reset tooling for the fitting database
//! (users and their body measurements).
//!
//! Each binary opens one connection, runs one operation from this crate and
//! closes the connection again whatever the outcome.

pub mod cli;
pub mod config;
pub mod db;
pub mod dumper;
pub mod error;
pub mod logging;
pub mod records;
pub mod row;
pub mod schema;
pub mod tables;
pub mod wiper;

pub use config::DbConfig;
pub use db::{DbConnection, Dialect};
pub use error::{DbError, Result};

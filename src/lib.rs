//! # mysql-query-helper
//!
//! Thin convenience layer over a single MySQL connection.
//!
//! [`QueryHelper`] checks each statement's leading keyword, binds `@name`
//! parameters from a [`Params`] set, runs the statement through
//! `mysql_async`, and returns either ordered rows or an affected-row count.

pub mod config;
pub mod engine;
pub mod error;
pub mod helper;
pub mod logging;
pub mod mysql;
pub mod params;
pub mod statement;
pub mod types;

pub use self::config::{ConnectionSettings, HelperConfig, SslMode, DEFAULT_CONNECTION_STRING};
pub use engine::QueryExecutor;
pub use error::{Error, Result};
pub use helper::QueryHelper;
pub use mysql::MySqlConnection;
pub use params::Params;
pub use statement::StatementKind;
pub use types::{QueryOutcome, ResultRow, Value};

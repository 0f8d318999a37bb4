//! MySQL module organization
//!
//! Driver-backed executor and parameter conversion for `mysql_async`

pub mod connection;
pub mod param_converter;

pub use connection::MySqlConnection;
pub use param_converter::{BoundStatement, MySqlParamConverter};

//! Error types for the MySQL query helper.

use thiserror::Error;

/// Result type alias for helper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for helper operations
#[derive(Debug, Error)]
pub enum Error {
    /// Statement text does not match the statement type the operation requires
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection could not be opened, or is closed or broken
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Driver-level execution failure or result extraction failure
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Parameter record could not be turned into a parameter set
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Malformed connection string or configuration source
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connectivity(_))
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Error::Runtime(_))
    }
}

impl From<mysql_async::Error> for Error {
    fn from(err: mysql_async::Error) -> Self {
        use mysql_async::DriverError;

        match err {
            mysql_async::Error::Io(e) => Error::Connectivity(e.to_string()),
            mysql_async::Error::Driver(
                e @ (DriverError::ConnectionClosed | DriverError::PoolDisconnected),
            ) => Error::Connectivity(e.to_string()),
            mysql_async::Error::Url(e) => {
                Error::Config(format!("Invalid connection string: {}", e))
            }
            other => Error::Runtime(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

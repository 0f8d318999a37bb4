//! MySQL Connection Implementation
//!
//! Single-session executor on top of `mysql_async::Conn`

use super::param_converter::{BoundStatement, MySqlParamConverter};
use crate::config::ConnectionSettings;
use crate::engine::QueryExecutor;
use crate::error::{Error, Result};
use crate::params::Params;
use crate::types::ResultRow;
use async_trait::async_trait;
use mysql_async::{prelude::*, Conn, Row};
use tracing::{debug, info};

/// MySQL Database Connection
pub struct MySqlConnection {
    conn: Option<Conn>,
    convert_zero_datetime: bool,
    allow_user_variables: bool,
}

impl MySqlConnection {
    /// Open a new connection from a connection string
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let settings = ConnectionSettings::parse(connection_string)?;
        Self::open(&settings).await
    }

    /// Open a new connection from parsed settings
    pub async fn open(settings: &ConnectionSettings) -> Result<Self> {
        settings.validate()?;

        let connecting = Conn::new(settings.to_opts());
        let connected = match settings.connect_timeout() {
            Some(limit) => tokio::time::timeout(limit, connecting).await.map_err(|_| {
                Error::Connectivity(format!(
                    "Timed out after {}s connecting to MySQL at {}",
                    limit.as_secs(),
                    settings.display_target()
                ))
            })?,
            None => connecting.await,
        };
        let conn = connected.map_err(|e| {
            Error::Connectivity(format!(
                "Failed to connect to MySQL at {}: {}",
                settings.display_target(),
                e
            ))
        })?;

        info!("Opened MySQL connection to {}", settings.display_target());

        Ok(Self {
            conn: Some(conn),
            convert_zero_datetime: settings.convert_zero_datetime,
            allow_user_variables: settings.allow_user_variables,
        })
    }

    /// Adopt an already-open connection
    pub fn from_conn(conn: Conn) -> Self {
        Self {
            conn: Some(conn),
            convert_zero_datetime: false,
            allow_user_variables: false,
        }
    }

    pub fn with_zero_datetime_conversion(mut self, enabled: bool) -> Self {
        self.convert_zero_datetime = enabled;
        self
    }

    /// Send `@name` references without a parameter as user variables
    pub fn with_user_variables(mut self, enabled: bool) -> Self {
        self.allow_user_variables = enabled;
        self
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Hand the underlying connection back to the caller
    pub fn into_inner(self) -> Option<Conn> {
        self.conn
    }

    fn conn_mut(&mut self) -> Result<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| Error::Connectivity("Connection is closed".to_string()))
    }

    fn bind(&self, sql: &str, params: &Params) -> Result<BoundStatement> {
        let bound = MySqlParamConverter::bind_named(sql, params);
        if !self.allow_user_variables {
            return bound.require_all_bound();
        }
        if !bound.unbound.is_empty() {
            debug!("User variables passed through: {:?}", bound.unbound);
        }
        Ok(bound)
    }

    fn convert_row(&self, row: Row) -> Result<ResultRow> {
        let columns = row.columns();
        let values = row.unwrap();
        let mut result = ResultRow::with_capacity(columns.len());

        for (column, value) in columns.iter().zip(values) {
            let name = column.name_str();
            let value =
                MySqlParamConverter::convert_from_mysql_value(value, self.convert_zero_datetime);
            if !result.push(&*name, value) {
                return Err(Error::Runtime(format!(
                    "Duplicate column name in result set: {}",
                    name
                )));
            }
        }

        Ok(result)
    }
}

#[async_trait]
impl QueryExecutor for MySqlConnection {
    async fn query(&mut self, sql: &str, params: &Params) -> Result<Vec<ResultRow>> {
        let bound = self.bind(sql, params)?;

        let conn = self.conn_mut()?;
        let rows: Vec<Row> = conn.exec(bound.sql.as_str(), bound.values).await?;

        rows.into_iter().map(|row| self.convert_row(row)).collect()
    }

    async fn execute(&mut self, sql: &str, params: &Params) -> Result<u64> {
        let bound = self.bind(sql, params)?;

        let conn = self.conn_mut()?;
        conn.exec_drop(bound.sql.as_str(), bound.values).await?;

        Ok(conn.affected_rows())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.disconnect().await.map_err(|e| {
                Error::Connectivity(format!("Failed to close connection: {}", e))
            })?;
            info!("Closed MySQL connection");
        }
        Ok(())
    }
}

//! Query helper
//!
//! Convenience operations over a single connection. Each operation trims the
//! statement, checks its leading keyword, binds `@name` parameters and runs it
//! through the executor.
//!
//! ```no_run
//! use mysql_query_helper::{params, QueryHelper};
//!
//! # async fn example() -> mysql_query_helper::Result<()> {
//! let mut db = QueryHelper::connect("mysql://root@localhost:3306/test").await?;
//!
//! db.insert(
//!     "INSERT INTO users (id, name) VALUES (@id, @name)",
//!     Some(&params! { "id" => 1, "name" => "a" }),
//! )
//! .await?;
//!
//! let users = db
//!     .select("SELECT * FROM users WHERE id = @id", Some(&params! { "id" => 1 }))
//!     .await?;
//! assert_eq!(users.len(), 1);
//!
//! db.close_connection().await;
//! # Ok(())
//! # }
//! ```

use crate::config::{ConnectionSettings, DEFAULT_CONNECTION_STRING};
use crate::engine::QueryExecutor;
use crate::error::{Error, Result};
use crate::mysql::MySqlConnection;
use crate::params::Params;
use crate::statement::{self, StatementKind};
use crate::types::{QueryOutcome, ResultRow};
use futures::future::BoxFuture;
use std::sync::LazyLock;
use tracing::{debug, warn};

static NO_PARAMS: LazyLock<Params> = LazyLock::new(Params::new);

/// Thin helper over one database session
pub struct QueryHelper<E = MySqlConnection> {
    executor: E,
}

impl QueryHelper<MySqlConnection> {
    /// Open a connection with [`DEFAULT_CONNECTION_STRING`]
    pub async fn new() -> Result<Self> {
        Self::connect(DEFAULT_CONNECTION_STRING).await
    }

    /// Open a connection from a `mysql://` URL or `key=value;` string
    pub async fn connect(connection_string: &str) -> Result<Self> {
        Ok(Self::with_executor(
            MySqlConnection::connect(connection_string).await?,
        ))
    }

    /// Open a connection from parsed settings
    pub async fn open(settings: &ConnectionSettings) -> Result<Self> {
        Ok(Self::with_executor(MySqlConnection::open(settings).await?))
    }

    /// Adopt an already-open connection without opening a new one
    pub fn from_conn(conn: mysql_async::Conn) -> Self {
        Self::with_executor(MySqlConnection::from_conn(conn))
    }

    /// Open a connection, run `f` with it, then close it.
    ///
    /// The connection is closed whether or not `f` succeeds; `f`'s result is
    /// returned unchanged.
    ///
    /// ```no_run
    /// use mysql_query_helper::QueryHelper;
    ///
    /// # async fn example() -> mysql_query_helper::Result<()> {
    /// let total = QueryHelper::scoped("mysql://root@localhost/test", |db| {
    ///     Box::pin(async move { db.count("SELECT COUNT(*) FROM users", None).await })
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<T, F>(connection_string: &str, f: F) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut QueryHelper<MySqlConnection>) -> BoxFuture<'c, Result<T>>,
    {
        let mut helper = Self::connect(connection_string).await?;
        helper.run_scoped(f).await
    }
}

impl<E: QueryExecutor> QueryHelper<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Run `f` against this helper, then close the connection
    pub async fn run_scoped<T, F>(&mut self, f: F) -> Result<T>
    where
        F: for<'c> FnOnce(&'c mut QueryHelper<E>) -> BoxFuture<'c, Result<T>>,
    {
        let result = f(&mut *self).await;
        self.close_connection().await;
        result
    }

    async fn execute_query(&mut self, sql: &str, data: Option<&Params>) -> Result<Vec<ResultRow>> {
        let params = data.unwrap_or(&*NO_PARAMS);
        debug!(sql, params = %params.summary(), "executing query");
        self.executor.query(sql, params).await
    }

    async fn execute_non_query(&mut self, sql: &str, data: Option<&Params>) -> Result<u64> {
        let params = data.unwrap_or(&*NO_PARAMS);
        debug!(sql, params = %params.summary(), "executing statement");
        self.executor.execute(sql, params).await
    }

    /// Run a `SELECT` statement and return every row
    pub async fn select(&mut self, sql: &str, data: Option<&Params>) -> Result<Vec<ResultRow>> {
        let sql = statement::require(sql, StatementKind::Select)?;
        self.execute_query(sql, data).await
    }

    /// Run an `UPDATE` statement and return the affected-row count
    pub async fn update(&mut self, sql: &str, data: Option<&Params>) -> Result<u64> {
        let sql = statement::require(sql, StatementKind::Update)?;
        self.execute_non_query(sql, data).await
    }

    /// Run a `DELETE` statement and return the affected-row count
    pub async fn delete(&mut self, sql: &str, data: Option<&Params>) -> Result<u64> {
        let sql = statement::require(sql, StatementKind::Delete)?;
        self.execute_non_query(sql, data).await
    }

    /// Run an `INSERT` statement and return the affected-row count
    pub async fn insert(&mut self, sql: &str, data: Option<&Params>) -> Result<u64> {
        let sql = statement::require(sql, StatementKind::Insert)?;
        self.execute_non_query(sql, data).await
    }

    /// Run a `SELECT COUNT(...)` statement and return the count
    pub async fn count(&mut self, sql: &str, data: Option<&Params>) -> Result<i64> {
        let sql = statement::require(sql, StatementKind::Count)?;
        let rows = self.execute_query(sql, data).await?;
        extract_count(rows)
    }

    /// Dispatch on the statement type.
    ///
    /// - `SELECT COUNT(...)` returns [`QueryOutcome::Count`]
    /// - other `SELECT` statements return [`QueryOutcome::Rows`]
    /// - `INSERT`, `UPDATE` and `DELETE` return [`QueryOutcome::Affected`]
    pub async fn query(&mut self, sql: &str, data: Option<&Params>) -> Result<QueryOutcome> {
        let (kind, sql) = statement::classify(sql)?;
        match kind {
            StatementKind::Count => {
                let rows = self.execute_query(sql, data).await?;
                extract_count(rows).map(QueryOutcome::Count)
            }
            StatementKind::Select => self.execute_query(sql, data).await.map(QueryOutcome::Rows),
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete => self
                .execute_non_query(sql, data)
                .await
                .map(QueryOutcome::Affected),
        }
    }

    /// Close the connection. Failures are logged and reported as `false`.
    pub async fn close_connection(&mut self) -> bool {
        match self.executor.close().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to close connection: {}", e);
                false
            }
        }
    }
}

/// First column of the first row, as an integer
fn extract_count(rows: Vec<ResultRow>) -> Result<i64> {
    let row = rows
        .into_iter()
        .next()
        .ok_or_else(|| Error::Runtime("COUNT query returned no rows".to_string()))?;
    let (column, value) = row
        .first()
        .ok_or_else(|| Error::Runtime("COUNT query returned no columns".to_string()))?;

    value.as_i64().ok_or_else(|| {
        Error::Runtime(format!(
            "COUNT column '{}' is not an integer: {:?}",
            column, value
        ))
    })
}

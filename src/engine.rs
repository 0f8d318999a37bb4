//! Executor abstraction
//!
//! The helper validates statements and shapes results; an executor owns the
//! live session and runs already-validated statements against it.

use crate::error::Result;
use crate::params::Params;
use crate::types::ResultRow;
use async_trait::async_trait;

/// A single database session able to run statements
#[async_trait]
pub trait QueryExecutor: Send {
    /// Run a row-returning statement and materialize every row
    async fn query(&mut self, sql: &str, params: &Params) -> Result<Vec<ResultRow>>;

    /// Run a statement and return the affected-row count
    async fn execute(&mut self, sql: &str, params: &Params) -> Result<u64>;

    /// Release the session. Closing an already-closed session is a no-op.
    async fn close(&mut self) -> Result<()>;
}

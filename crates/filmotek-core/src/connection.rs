//! Storage connection traits.
//!
//! - [`Connection`] - executes parameterized statements and opens transactions
//! - [`TransactionOps`] - statement execution scoped to one open transaction
//!
//! All operations take a `Cx` context so a cancelled caller stops issuing
//! statements, and report through `Outcome`.

use crate::dialect::Dialect;
use crate::row::Row;
use crate::value::Value;
use asupersync::{Cx, Outcome};
use std::future::Future;

/// A storage connection capable of executing statements.
///
/// Implementations must be `Send + Sync` for use across async boundaries.
/// Affected-row counts are reported exactly, and constraint failures carry a
/// SQLSTATE so foreign-key violations can be told apart from other errors.
///
/// # Example
///
/// ```rust,ignore
/// let tx = conn.begin(&cx).await?;
/// tx.execute(&cx, "UPDATE films SET rating = ?1 WHERE id = ?2", &[Value::Int(9), Value::BigInt(1)]).await?;
/// tx.commit(&cx).await?;
/// ```
pub trait Connection: Send + Sync {
    /// The transaction type returned by this connection.
    type Tx<'conn>: TransactionOps
    where
        Self: 'conn;

    /// SQL dialect spoken by this connection.
    fn dialect(&self) -> Dialect;

    /// Execute a query and return all rows.
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, crate::Error>> + Send;

    /// Execute a query and return the first row, if any.
    fn query_one(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Option<Row>, crate::Error>> + Send;

    /// Execute a statement (INSERT, UPDATE, DELETE) and return rows affected.
    fn execute(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<u64, crate::Error>> + Send;

    /// Execute an INSERT and return the generated identity.
    fn insert(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<i64, crate::Error>> + Send;

    /// Begin a transaction.
    ///
    /// A connection runs one transaction at a time: while one is open, other
    /// callers wait for it to finish rather than share it.
    fn begin(&self, cx: &Cx) -> impl Future<Output = Outcome<Self::Tx<'_>, crate::Error>> + Send;
}

/// Statement execution inside one open transaction.
///
/// Transactions must be explicitly committed; dropping one without
/// committing rolls it back.
pub trait TransactionOps: Send {
    /// Execute a query within this transaction.
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, crate::Error>> + Send;

    /// Execute a query and return the first row, if any.
    fn query_one(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Option<Row>, crate::Error>> + Send;

    /// Execute a statement within this transaction and return rows affected.
    fn execute(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<u64, crate::Error>> + Send;

    /// Execute an INSERT within this transaction and return the generated identity.
    fn insert(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<i64, crate::Error>> + Send;

    /// Commit the transaction, making all changes permanent.
    fn commit(self, cx: &Cx) -> impl Future<Output = Outcome<(), crate::Error>> + Send;

    /// Rollback the transaction, discarding all changes.
    fn rollback(self, cx: &Cx) -> impl Future<Output = Outcome<(), crate::Error>> + Send;
}

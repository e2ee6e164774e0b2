use std::future::Future;

use crate::error::DataError;
use crate::mapper::RowMapper;
use crate::named::{expand_named, NamedParams, PlaceholderStyle};
use crate::value::SqlValue;

/// Supplies the bind values of each row of a batch statement.
pub trait BatchBinder: Send + Sync {
    /// Number of times the statement is executed.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bind values for the `index`-th execution.
    fn bind(&self, index: usize) -> Result<Vec<SqlValue>, DataError>;
}

impl BatchBinder for Vec<Vec<SqlValue>> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn bind(&self, index: usize) -> Result<Vec<SqlValue>, DataError> {
        self.get(index)
            .cloned()
            .ok_or_else(|| DataError::contract(format!("batch row {index} out of range")))
    }
}

/// [`BatchBinder`] built from a row count and a binding closure.
pub struct FnBinder<F> {
    len: usize,
    bind: F,
}

impl<F> FnBinder<F>
where
    F: Fn(usize) -> Result<Vec<SqlValue>, DataError> + Send + Sync,
{
    pub fn new(len: usize, bind: F) -> Self {
        Self { len, bind }
    }
}

impl<F> BatchBinder for FnBinder<F>
where
    F: Fn(usize) -> Result<Vec<SqlValue>, DataError> + Send + Sync,
{
    fn len(&self) -> usize {
        self.len
    }

    fn bind(&self, index: usize) -> Result<Vec<SqlValue>, DataError> {
        (self.bind)(index)
    }
}

/// Executes SQL against a database. Implemented by backend crates.
///
/// The executor owns connections, pooling, timeouts and any transaction
/// handling; failures are returned as-is and never retried.
///
/// Uses RPITIT (return-position `impl Trait` in traits), so no `async-trait`.
pub trait Executor: Send + Sync {
    /// Positional placeholder syntax used when expanding named queries.
    fn placeholder_style(&self) -> PlaceholderStyle;

    /// Run a query and map every row, in result order.
    fn query<T: Send>(
        &self,
        sql: &str,
        params: &[SqlValue],
        mapper: &dyn RowMapper<T>,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send;

    /// Run a query expected to return zero or one row.
    fn query_one<T: Send>(
        &self,
        sql: &str,
        params: &[SqlValue],
        mapper: &dyn RowMapper<T>,
    ) -> impl Future<Output = Result<Option<T>, DataError>> + Send {
        async move {
            let mut rows = self.query(sql, params, mapper).await?;
            match rows.len() {
                0 | 1 => Ok(rows.pop()),
                actual => Err(DataError::IncorrectResultSize {
                    expected: 1,
                    actual,
                }),
            }
        }
    }

    /// Run a statement and return the number of affected rows.
    fn update(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<u64, DataError>> + Send;

    /// Run one statement once per bound row and return each affected count.
    fn batch(
        &self,
        sql: &str,
        binder: &dyn BatchBinder,
    ) -> impl Future<Output = Result<Vec<u64>, DataError>> + Send;

    /// Value of a single-row, single-column query, or `None` when no row
    /// matched.
    ///
    /// More than one row is [`DataError::IncorrectResultSize`]; any column
    /// count other than one is [`DataError::IncorrectColumnCount`].
    fn scalar(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<Option<SqlValue>, DataError>> + Send;

    fn query_named<T: Send>(
        &self,
        sql: &str,
        params: &NamedParams,
        mapper: &dyn RowMapper<T>,
    ) -> impl Future<Output = Result<Vec<T>, DataError>> + Send {
        async move {
            let (sql, values) = expand_named(sql, params, self.placeholder_style())?;
            self.query(&sql, &values, mapper).await
        }
    }

    fn scalar_named(
        &self,
        sql: &str,
        params: &NamedParams,
    ) -> impl Future<Output = Result<Option<SqlValue>, DataError>> + Send {
        async move {
            let (sql, values) = expand_named(sql, params, self.placeholder_style())?;
            self.scalar(&sql, &values).await
        }
    }
}

use std::sync::Arc;

use crate::config::DataConfig;
use crate::dialect::PaginationStrategy;
use crate::envelope::Envelope;
use crate::error::DataError;
use crate::executor::{BatchBinder, Executor};
use crate::mapper::{MapperRegistry, RowMapper};
use crate::named::{count_placeholder, NamedParams};
use crate::page::Pageable;
use crate::query::{named_params_log_string, params_log_string};
use crate::sql_source::{MapSqlSource, SqlSource};
use crate::value::{FromSqlValue, SqlValue};

/// Generic SQL repository over an [`Executor`].
///
/// The pagination strategy is fixed at construction; the repository appends
/// its clause to caller-supplied SQL and never inspects the dialect itself.
/// Every operation returns an [`Envelope`]: this is the one place where
/// executor failures become `Envelope::Error`.
///
/// # Example
///
/// ```ignore
/// let repo = GenericRepository::new(SqlxExecutor::new(pool), LimitOffset)
///     .with_sql_source(MapSqlSource::from_yaml_file("sql.yaml")?)
///     .with_mappers(MapperRegistry::builder().register::<User>().build());
///
/// let users = repo
///     .find_all_paged::<User>(&repo.sql("user.find_all")?, &[], &pageable)
///     .await
///     .sort_by(|a, b| a.name.cmp(&b.name))
///     .to_page(pageable, total);
/// ```
#[derive(Clone)]
pub struct GenericRepository<X> {
    executor: X,
    pagination: Arc<dyn PaginationStrategy>,
    sql_source: Arc<dyn SqlSource>,
    mappers: Arc<MapperRegistry>,
}

/// Convert an operation result into an envelope, logging failures.
fn settle<T>(operation: &'static str, result: Result<T, DataError>) -> Envelope<T> {
    if let Err(err) = &result {
        tracing::warn!(operation, kind = ?err.kind(), error = %err, "Data operation failed");
    }
    Envelope::from(result)
}

impl<X: Executor> GenericRepository<X> {
    pub fn new(executor: X, pagination: impl PaginationStrategy + 'static) -> Self {
        Self::with_strategy(executor, Arc::new(pagination))
    }

    pub fn with_strategy(executor: X, pagination: Arc<dyn PaginationStrategy>) -> Self {
        Self {
            executor,
            pagination,
            sql_source: Arc::new(MapSqlSource::new()),
            mappers: Arc::new(MapperRegistry::empty()),
        }
    }

    /// Build a repository using the configured dialect and SQL texts.
    pub fn from_config(executor: X, config: &DataConfig) -> Result<Self, DataError> {
        Ok(Self::with_strategy(executor, config.strategy()?).with_sql_source(config.sql_source()?))
    }

    pub fn with_sql_source(mut self, source: impl SqlSource + 'static) -> Self {
        self.sql_source = Arc::new(source);
        self
    }

    pub fn with_mappers(mut self, mappers: impl Into<Arc<MapperRegistry>>) -> Self {
        self.mappers = mappers.into();
        self
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn pagination(&self) -> &dyn PaginationStrategy {
        self.pagination.as_ref()
    }

    /// SQL text registered under `code`.
    pub fn sql(&self, code: &str) -> Result<String, DataError> {
        self.sql_source.lookup(code)
    }

    /// `sql` with this repository's pagination applied.
    pub fn paginate(&self, sql: &str, pageable: &Pageable) -> Result<String, DataError> {
        self.pagination.paginate(sql, pageable)
    }

    async fn run_query<T: Send>(
        &self,
        sql: &str,
        params: &[SqlValue],
        mapper: &dyn RowMapper<T>,
    ) -> Result<Vec<T>, DataError> {
        tracing::debug!(sql, "{}", params_log_string(params));
        let rows = self.executor.query(sql, params, mapper).await?;
        tracing::debug!(rows = rows.len(), "Query finished");
        Ok(rows)
    }

    async fn run_named<T: Send>(
        &self,
        sql: &str,
        params: &NamedParams,
        mapper: &dyn RowMapper<T>,
    ) -> Result<Vec<T>, DataError> {
        tracing::debug!(sql, "{}", named_params_log_string(params));
        let rows = self.executor.query_named(sql, params, mapper).await?;
        tracing::debug!(rows = rows.len(), "Query finished");
        Ok(rows)
    }

    /// Run `sql` and map every row. No rows is `Ok` with an empty list.
    pub async fn query_all<T: Send>(
        &self,
        sql: &str,
        params: &[SqlValue],
        mapper: &dyn RowMapper<T>,
    ) -> Envelope<Vec<T>> {
        settle("query_all", self.run_query(sql, params, mapper).await)
    }

    /// Run `sql` with the pagination clause for `pageable` applied.
    ///
    /// Only the requested slice is fetched; computing the total is left to
    /// the caller (see [`Envelope::to_page_counted`]).
    pub async fn query_all_paged<T: Send>(
        &self,
        sql: &str,
        params: &[SqlValue],
        pageable: &Pageable,
        mapper: &dyn RowMapper<T>,
    ) -> Envelope<Vec<T>> {
        let result = async {
            let paged = self.paginate(sql, pageable)?;
            self.run_query(&paged, params, mapper).await
        }
        .await;
        settle("query_all_paged", result)
    }

    /// Run `sql` expecting zero or one row. No row is `Ok(None)`.
    pub async fn query_one<T: Send>(
        &self,
        sql: &str,
        params: &[SqlValue],
        mapper: &dyn RowMapper<T>,
    ) -> Envelope<Option<T>> {
        tracing::debug!(sql, "{}", params_log_string(params));
        settle("query_one", self.executor.query_one(sql, params, mapper).await)
    }

    /// Run a query whose `:placeholder` binds to a list, e.g.
    /// `SELECT * FROM users WHERE id IN (:ids)`.
    ///
    /// The placeholder must appear exactly once. An empty `values` list
    /// yields `Ok` with an empty list and no round trip, since `IN ()` is not
    /// valid SQL on most engines.
    pub async fn query_all_by_column_in<T: Send, V: Into<SqlValue>>(
        &self,
        sql: &str,
        placeholder: &str,
        values: impl IntoIterator<Item = V>,
        mapper: &dyn RowMapper<T>,
    ) -> Envelope<Vec<T>> {
        let values: Vec<SqlValue> = values.into_iter().map(Into::into).collect();
        let result = async move {
            let occurrences = count_placeholder(sql, placeholder)?;
            if occurrences != 1 {
                return Err(DataError::contract(format!(
                    "placeholder `:{placeholder}` must appear exactly once, found {occurrences}"
                )));
            }
            if values.is_empty() {
                tracing::debug!(sql, placeholder, "Empty IN list, skipping query");
                return Ok(Vec::new());
            }
            let params = NamedParams::new().bind_list(placeholder, values);
            self.run_named(sql, &params, mapper).await
        }
        .await;
        settle("query_all_by_column_in", result)
    }

    /// Run a named-parameter query.
    pub async fn query_all_by_params<T: Send>(
        &self,
        sql: &str,
        params: &NamedParams,
        mapper: &dyn RowMapper<T>,
    ) -> Envelope<Vec<T>> {
        settle("query_all_by_params", self.run_named(sql, params, mapper).await)
    }

    /// Run a named-parameter query with pagination applied.
    pub async fn query_all_by_params_paged<T: Send>(
        &self,
        sql: &str,
        params: &NamedParams,
        pageable: &Pageable,
        mapper: &dyn RowMapper<T>,
    ) -> Envelope<Vec<T>> {
        let result = async {
            let paged = self.paginate(sql, pageable)?;
            self.run_named(&paged, params, mapper).await
        }
        .await;
        settle("query_all_by_params_paged", result)
    }

    fn coerce_scalar<R: FromSqlValue>(value: Option<SqlValue>) -> Result<R, DataError> {
        match value {
            Some(value) => R::from_sql_value(value, "scalar"),
            None => R::from_missing_row().ok_or(DataError::IncorrectResultSize {
                expected: 1,
                actual: 0,
            }),
        }
    }

    /// Run a single-row, single-column named query and coerce the value.
    ///
    /// No row coerces to `None` for `Option<R>` and is an
    /// `IncorrectResultSize` error otherwise.
    pub async fn execute_scalar<R: FromSqlValue>(
        &self,
        sql: &str,
        params: &NamedParams,
    ) -> Envelope<R> {
        tracing::debug!(sql, "{}", named_params_log_string(params));
        let result = async {
            let value = self.executor.scalar_named(sql, params).await?;
            Self::coerce_scalar(value)
        }
        .await;
        settle("execute_scalar", result)
    }

    /// Positional-parameter variant of [`execute_scalar`](Self::execute_scalar).
    pub async fn query_scalar<R: FromSqlValue>(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Envelope<R> {
        tracing::debug!(sql, "{}", params_log_string(params));
        let result = async {
            let value = self.executor.scalar(sql, params).await?;
            Self::coerce_scalar(value)
        }
        .await;
        settle("query_scalar", result)
    }

    /// Run a `SELECT COUNT(*)` style query.
    pub async fn count(&self, sql: &str, params: &[SqlValue]) -> Envelope<u64> {
        self.query_scalar::<u64>(sql, params).await
    }

    /// Run one statement and return the affected row count.
    pub async fn execute_update(&self, sql: &str, params: &[SqlValue]) -> Envelope<u64> {
        tracing::debug!(sql, "{}", params_log_string(params));
        settle("execute_update", self.executor.update(sql, params).await)
    }

    /// Run one statement for each row of `binder` in a single batch and
    /// return the total affected row count.
    pub async fn execute_batch(&self, sql: &str, binder: &dyn BatchBinder) -> Envelope<u64> {
        tracing::debug!(sql, rows = binder.len(), "Batch");
        if binder.is_empty() {
            return Envelope::Ok(0);
        }
        let result = self
            .executor
            .batch(sql, binder)
            .await
            .map(|counts| counts.iter().sum::<u64>());
        settle("execute_batch", result)
    }

    /// [`query_all`](Self::query_all) using the mapper registered for `T`.
    pub async fn find_all<T: Send + 'static>(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Envelope<Vec<T>> {
        let mapper = match self.mappers.resolve::<T>() {
            Ok(mapper) => mapper,
            Err(err) => return settle("find_all", Err(err)),
        };
        self.query_all(sql, params, mapper.as_ref()).await
    }

    /// [`query_all_paged`](Self::query_all_paged) using the mapper registered for `T`.
    pub async fn find_all_paged<T: Send + 'static>(
        &self,
        sql: &str,
        params: &[SqlValue],
        pageable: &Pageable,
    ) -> Envelope<Vec<T>> {
        let mapper = match self.mappers.resolve::<T>() {
            Ok(mapper) => mapper,
            Err(err) => return settle("find_all_paged", Err(err)),
        };
        self.query_all_paged(sql, params, pageable, mapper.as_ref())
            .await
    }

    /// [`query_one`](Self::query_one) using the mapper registered for `T`.
    pub async fn find_one<T: Send + 'static>(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Envelope<Option<T>> {
        let mapper = match self.mappers.resolve::<T>() {
            Ok(mapper) => mapper,
            Err(err) => return settle("find_one", Err(err)),
        };
        self.query_one(sql, params, mapper.as_ref()).await
    }

    /// [`query_all_by_column_in`](Self::query_all_by_column_in) using the
    /// mapper registered for `T`.
    pub async fn find_all_in<T: Send + 'static, V: Into<SqlValue>>(
        &self,
        sql: &str,
        placeholder: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Envelope<Vec<T>> {
        let mapper = match self.mappers.resolve::<T>() {
            Ok(mapper) => mapper,
            Err(err) => return settle("find_all_in", Err(err)),
        };
        self.query_all_by_column_in(sql, placeholder, values, mapper.as_ref())
            .await
    }
}

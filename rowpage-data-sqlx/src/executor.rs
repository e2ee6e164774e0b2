use sqlx::{Database, Pool};

/// [`Executor`](rowpage_data::Executor) backed by an `sqlx::Pool<DB>`.
///
/// Each call checks a connection out of the pool for one round trip.
/// Scalar queries must return at most one row of exactly one column.
/// Batches run inside a single transaction that is rolled back when any row
/// fails.
///
/// # Example
///
/// ```ignore
/// let pool = SqlitePool::connect("sqlite::memory:").await?;
/// let repo = GenericRepository::new(SqlxExecutor::new(pool), LimitOffset);
/// ```
pub struct SqlxExecutor<DB: Database> {
    pool: Pool<DB>,
}

impl<DB: Database> SqlxExecutor<DB> {
    pub fn new(pool: Pool<DB>) -> Self {
        Self { pool }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }
}

impl<DB: Database> Clone for SqlxExecutor<DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

macro_rules! impl_sqlx_executor {
    ($feature:literal, $module:ident, $db:ty, $style:expr) => {
        #[cfg(feature = $feature)]
        mod $module {
            use chrono::NaiveDateTime;
            use rowpage_data::{
                BatchBinder, DataError, Executor, PlaceholderStyle, RowMapper, SqlType, SqlValue,
            };
            use sqlx::query::Query;
            use sqlx::{Database, Row as _};

            use super::SqlxExecutor;
            use crate::error::SqlxErrorExt;
            use crate::row::SqlxRow;

            type DbQuery<'q> = Query<'q, $db, <$db as Database>::Arguments<'q>>;

            fn bind_value<'q>(query: DbQuery<'q>, value: &SqlValue) -> DbQuery<'q> {
                match value {
                    SqlValue::Null(ty) => match ty {
                        SqlType::Bool => query.bind(None::<bool>),
                        SqlType::Integer => query.bind(None::<i64>),
                        SqlType::Float => query.bind(None::<f64>),
                        SqlType::Text => query.bind(None::<String>),
                        SqlType::Timestamp => query.bind(None::<NaiveDateTime>),
                        SqlType::Bytes => query.bind(None::<Vec<u8>>),
                    },
                    SqlValue::Bool(b) => query.bind(*b),
                    SqlValue::Int(i) => query.bind(*i),
                    SqlValue::Float(f) => query.bind(*f),
                    SqlValue::Text(s) => query.bind(s.clone()),
                    SqlValue::Timestamp(ts) => query.bind(*ts),
                    SqlValue::Bytes(b) => query.bind(b.clone()),
                }
            }

            fn prepare<'q>(sql: &'q str, params: &[SqlValue]) -> DbQuery<'q> {
                params
                    .iter()
                    .fold(sqlx::query(sql), |query, value| bind_value(query, value))
            }

            impl Executor for SqlxExecutor<$db> {
                fn placeholder_style(&self) -> PlaceholderStyle {
                    $style
                }

                async fn query<T: Send>(
                    &self,
                    sql: &str,
                    params: &[SqlValue],
                    mapper: &dyn RowMapper<T>,
                ) -> Result<Vec<T>, DataError> {
                    let rows = prepare(sql, params)
                        .fetch_all(&self.pool)
                        .await
                        .map_err(SqlxErrorExt::into_data_error)?;
                    rows.into_iter()
                        .map(|row| mapper.map_row(&SqlxRow::new(row)))
                        .collect()
                }

                async fn update(&self, sql: &str, params: &[SqlValue]) -> Result<u64, DataError> {
                    let result = prepare(sql, params)
                        .execute(&self.pool)
                        .await
                        .map_err(SqlxErrorExt::into_data_error)?;
                    Ok(result.rows_affected())
                }

                async fn batch(
                    &self,
                    sql: &str,
                    binder: &dyn BatchBinder,
                ) -> Result<Vec<u64>, DataError> {
                    let mut tx = self
                        .pool
                        .begin()
                        .await
                        .map_err(SqlxErrorExt::into_data_error)?;
                    let mut counts = Vec::with_capacity(binder.len());
                    for index in 0..binder.len() {
                        let params = binder.bind(index)?;
                        let result = prepare(sql, &params)
                            .execute(&mut *tx)
                            .await
                            .map_err(SqlxErrorExt::into_data_error)?;
                        counts.push(result.rows_affected());
                    }
                    tx.commit().await.map_err(SqlxErrorExt::into_data_error)?;
                    tracing::debug!(rows = counts.len(), "Batch committed");
                    Ok(counts)
                }

                async fn scalar(
                    &self,
                    sql: &str,
                    params: &[SqlValue],
                ) -> Result<Option<SqlValue>, DataError> {
                    let mut rows = prepare(sql, params)
                        .fetch_all(&self.pool)
                        .await
                        .map_err(SqlxErrorExt::into_data_error)?;
                    if rows.len() > 1 {
                        return Err(DataError::IncorrectResultSize {
                            expected: 1,
                            actual: rows.len(),
                        });
                    }
                    let Some(row) = rows.pop() else {
                        return Ok(None);
                    };
                    let columns = row.columns().len();
                    if columns != 1 {
                        return Err(DataError::IncorrectColumnCount {
                            expected: 1,
                            actual: columns,
                        });
                    }
                    SqlxRow::new(row).value_at(0).map(Some)
                }
            }
        }
    };
}

impl_sqlx_executor!("sqlite", sqlite, sqlx::Sqlite, rowpage_data::PlaceholderStyle::Question);
impl_sqlx_executor!("postgres", postgres, sqlx::Postgres, rowpage_data::PlaceholderStyle::Dollar);
impl_sqlx_executor!("mysql", mysql, sqlx::MySql, rowpage_data::PlaceholderStyle::Question);

//! Adapter exposing SQLx rows through the [`Row`](rowpage_data::Row) trait.
//!
//! Column values are decoded into [`SqlValue`](rowpage_data::SqlValue) by the
//! column's declared type first, then by trying each supported Rust type in
//! turn. Type names are matched whole (`POINT` is not an integer).
//! `TIMESTAMPTZ` and other zoned timestamps are normalized to UTC.
//!
//! Engine types with no `SqlValue` counterpart are reported as a
//! [`DataError::TypeMismatch`](rowpage_data::DataError::TypeMismatch):
//! PostgreSQL `NUMERIC`, geometric and range types, MySQL `BIGINT UNSIGNED`
//! values above `i64::MAX`.

#[cfg(any(feature = "sqlite", feature = "postgres", feature = "mysql"))]
use rowpage_data::{DataError, SqlValue};
#[cfg(any(feature = "sqlite", feature = "postgres", feature = "mysql", test))]
use rowpage_data::SqlType;

/// A driver row wrapped for use with [`RowMapper`](rowpage_data::RowMapper)s.
pub struct SqlxRow<R> {
    row: R,
}

impl<R> SqlxRow<R> {
    pub fn new(row: R) -> Self {
        Self { row }
    }

    pub fn into_inner(self) -> R {
        self.row
    }
}

/// Classify an engine type name such as `INT8`, `VARCHAR(255)` or
/// `BIGINT UNSIGNED`.
#[cfg(any(feature = "sqlite", feature = "postgres", feature = "mysql", test))]
pub(crate) fn classify(type_name: &str) -> SqlType {
    let upper = type_name.trim().to_ascii_uppercase();
    let base = upper.split('(').next().unwrap_or_default().trim();
    let base = base.strip_suffix(" UNSIGNED").unwrap_or(base);
    match base {
        "BOOL" | "BOOLEAN" => SqlType::Bool,
        "INT" | "INTEGER" | "INT2" | "INT4" | "INT8" | "TINYINT" | "SMALLINT" | "MEDIUMINT"
        | "BIGINT" | "SMALLSERIAL" | "SERIAL" | "BIGSERIAL" => SqlType::Integer,
        "REAL" | "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE" | "DOUBLE PRECISION" => SqlType::Float,
        "TIMESTAMP" | "TIMESTAMPTZ" | "DATETIME" => SqlType::Timestamp,
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BYTEA" | "BINARY" | "VARBINARY" => {
            SqlType::Bytes
        }
        _ => SqlType::Text,
    }
}

/// Return the first of `types` that decodes the column at `index`.
#[cfg(any(feature = "sqlite", feature = "postgres", feature = "mysql"))]
macro_rules! attempt {
    ($row:expr, $index:expr; $($t:ty => $wrap:expr),+ $(,)?) => {{
        $(
            if let Ok(v) = $row.try_get::<$t, _>($index) {
                return Ok($wrap(v));
            }
        )+
    }};
}

macro_rules! impl_sqlx_row {
    ($feature:literal, $row:ty) => {
        #[cfg(feature = $feature)]
        impl SqlxRow<$row> {
            fn index_of(&self, column: &str) -> Result<usize, DataError> {
                use sqlx::{Column as _, Row as _};

                let columns = self.row.columns();
                columns
                    .iter()
                    .position(|c| c.name() == column)
                    .or_else(|| {
                        columns
                            .iter()
                            .position(|c| c.name().eq_ignore_ascii_case(column))
                    })
                    .ok_or_else(|| DataError::ColumnNotFound(column.to_string()))
            }

            /// Decode the value at `index`.
            pub fn value_at(&self, index: usize) -> Result<SqlValue, DataError> {
                use sqlx::{Column as _, Row as _, TypeInfo as _, ValueRef as _};

                let column = self
                    .row
                    .columns()
                    .get(index)
                    .ok_or_else(|| DataError::ColumnNotFound(format!("#{index}")))?;
                let name = column.name();
                let declared = classify(column.type_info().name());

                let raw = self
                    .row
                    .try_get_raw(index)
                    .map_err(crate::SqlxErrorExt::into_data_error)?;
                if raw.is_null() {
                    return Ok(SqlValue::Null(declared));
                }

                match declared {
                    SqlType::Bool => attempt!(self.row, index; bool => SqlValue::Bool),
                    SqlType::Integer => attempt!(
                        self.row, index;
                        i64 => SqlValue::Int,
                        i32 => |v: i32| SqlValue::Int(v.into()),
                        i16 => |v: i16| SqlValue::Int(v.into()),
                    ),
                    SqlType::Float => attempt!(
                        self.row, index;
                        f64 => SqlValue::Float,
                        f32 => |v: f32| SqlValue::Float(v.into()),
                    ),
                    SqlType::Timestamp => attempt!(
                        self.row, index;
                        chrono::NaiveDateTime => SqlValue::Timestamp,
                        chrono::DateTime<chrono::Utc> => |v: chrono::DateTime<chrono::Utc>| {
                            SqlValue::Timestamp(v.naive_utc())
                        },
                    ),
                    SqlType::Bytes => attempt!(self.row, index; Vec<u8> => SqlValue::Bytes),
                    SqlType::Text => attempt!(self.row, index; String => SqlValue::Text),
                }

                // Declared type and stored value disagree (SQLite is dynamically typed).
                attempt!(
                    self.row, index;
                    i64 => SqlValue::Int,
                    i32 => |v: i32| SqlValue::Int(v.into()),
                    f64 => SqlValue::Float,
                    bool => SqlValue::Bool,
                    String => SqlValue::Text,
                    chrono::NaiveDateTime => SqlValue::Timestamp,
                    Vec<u8> => SqlValue::Bytes,
                );

                tracing::debug!(column = name, "Unsupported column type");
                Err(DataError::TypeMismatch {
                    column: name.to_string(),
                    expected: "a supported SQL type",
                })
            }
        }

        #[cfg(feature = $feature)]
        impl rowpage_data::Row for SqlxRow<$row> {
            fn columns(&self) -> Vec<String> {
                use sqlx::{Column as _, Row as _};

                self.row
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            }

            fn get_value(&self, column: &str) -> Result<SqlValue, DataError> {
                let index = self.index_of(column)?;
                self.value_at(index)
            }
        }
    };
}

impl_sqlx_row!("sqlite", sqlx::sqlite::SqliteRow);
impl_sqlx_row!("postgres", sqlx::postgres::PgRow);
impl_sqlx_row!("mysql", sqlx::mysql::MySqlRow);

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::error::DataError;
use crate::value::{FromSqlValue, SqlValue};

/// Read-only access to one result row, by column name.
///
/// Backends implement [`Row::columns`] and [`Row::get_value`]; the typed
/// accessors decode through [`FromSqlValue`]. SQL NULL comes back as `None`.
/// Asking for a column the result set does not have is
/// [`DataError::ColumnNotFound`].
pub trait Row {
    /// Column names in result order.
    fn columns(&self) -> Vec<String>;

    fn get_value(&self, column: &str) -> Result<SqlValue, DataError>;

    fn get<T: FromSqlValue>(&self, column: &str) -> Result<Option<T>, DataError>
    where
        Self: Sized,
    {
        Option::<T>::from_sql_value(self.get_value(column)?, column)
    }

    fn get_string(&self, column: &str) -> Result<Option<String>, DataError> {
        Option::from_sql_value(self.get_value(column)?, column)
    }

    fn get_i64(&self, column: &str) -> Result<Option<i64>, DataError> {
        Option::from_sql_value(self.get_value(column)?, column)
    }

    fn get_i32(&self, column: &str) -> Result<Option<i32>, DataError> {
        Option::from_sql_value(self.get_value(column)?, column)
    }

    fn get_f64(&self, column: &str) -> Result<Option<f64>, DataError> {
        Option::from_sql_value(self.get_value(column)?, column)
    }

    fn get_bool(&self, column: &str) -> Result<Option<bool>, DataError> {
        Option::from_sql_value(self.get_value(column)?, column)
    }

    fn get_timestamp(&self, column: &str) -> Result<Option<NaiveDateTime>, DataError> {
        Option::from_sql_value(self.get_value(column)?, column)
    }
}

fn absent_as_none<T>(res: Result<Option<T>, DataError>) -> Result<Option<T>, DataError> {
    match res {
        Err(DataError::ColumnNotFound(_)) => Ok(None),
        other => other,
    }
}

fn required<T>(res: Result<Option<T>, DataError>, column: &str) -> Result<T, DataError> {
    res?.ok_or_else(|| DataError::UnexpectedNull(column.to_string()))
}

/// Convenience accessors layered on top of [`Row`].
///
/// - `opt_*`: the column may be missing from this particular result set;
///   a missing column reads as `None` instead of an error.
/// - `require_*`: the value must be present; NULL is
///   [`DataError::UnexpectedNull`].
pub trait RowExt: Row {
    fn opt_string(&self, column: &str) -> Result<Option<String>, DataError> {
        absent_as_none(self.get_string(column))
    }

    fn opt_i64(&self, column: &str) -> Result<Option<i64>, DataError> {
        absent_as_none(self.get_i64(column))
    }

    fn opt_i32(&self, column: &str) -> Result<Option<i32>, DataError> {
        absent_as_none(self.get_i32(column))
    }

    fn opt_f64(&self, column: &str) -> Result<Option<f64>, DataError> {
        absent_as_none(self.get_f64(column))
    }

    fn opt_bool(&self, column: &str) -> Result<Option<bool>, DataError> {
        absent_as_none(self.get_bool(column))
    }

    fn opt_timestamp(&self, column: &str) -> Result<Option<NaiveDateTime>, DataError> {
        absent_as_none(self.get_timestamp(column))
    }

    fn require_string(&self, column: &str) -> Result<String, DataError> {
        required(self.get_string(column), column)
    }

    fn require_i64(&self, column: &str) -> Result<i64, DataError> {
        required(self.get_i64(column), column)
    }

    fn require_i32(&self, column: &str) -> Result<i32, DataError> {
        required(self.get_i32(column), column)
    }

    fn require_f64(&self, column: &str) -> Result<f64, DataError> {
        required(self.get_f64(column), column)
    }

    fn require_bool(&self, column: &str) -> Result<bool, DataError> {
        required(self.get_bool(column), column)
    }

    fn require_timestamp(&self, column: &str) -> Result<NaiveDateTime, DataError> {
        required(self.get_timestamp(column), column)
    }

    /// Collect every column whose name starts with `prefix` (ASCII
    /// case-insensitive).
    fn columns_starting_with(&self, prefix: &str) -> Result<BTreeMap<String, SqlValue>, DataError> {
        let prefix = prefix.to_ascii_lowercase();
        let mut out = BTreeMap::new();
        for column in self.columns() {
            if column.to_ascii_lowercase().starts_with(&prefix) {
                let value = self.get_value(&column)?;
                out.insert(column, value);
            }
        }
        Ok(out)
    }
}

impl<R: Row + ?Sized> RowExt for R {}

/// In-memory row, handy for tests and for adapting non-SQL sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueRow {
    values: Vec<(String, SqlValue)>,
}

impl ValueRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }
}

impl Row for ValueRow {
    fn columns(&self) -> Vec<String> {
        self.values.iter().map(|(name, _)| name.clone()).collect()
    }

    fn get_value(&self, column: &str) -> Result<SqlValue, DataError> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| DataError::ColumnNotFound(column.to_string()))
    }
}

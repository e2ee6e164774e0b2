use chrono::NaiveDateTime;

use crate::error::DataError;

/// Declared SQL type of a value, used to bind typed NULLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Bool,
    Integer,
    Float,
    Text,
    Timestamp,
    Bytes,
}

/// A single bind parameter or decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null(SqlType),
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null(_))
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            SqlValue::Null(ty) => *ty,
            SqlValue::Bool(_) => SqlType::Bool,
            SqlValue::Int(_) => SqlType::Integer,
            SqlValue::Float(_) => SqlType::Float,
            SqlValue::Text(_) => SqlType::Text,
            SqlValue::Timestamp(_) => SqlType::Timestamp,
            SqlValue::Bytes(_) => SqlType::Bytes,
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null(_) => f.write_str("NULL"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Int(i) => write!(f, "{i}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(s) => f.write_str(s),
            SqlValue::Timestamp(ts) => write!(f, "{ts}"),
            SqlValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! impl_from_value {
    ($($t:ty => $variant:ident as $cast:ty, $ty:ident;)*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    SqlValue::$variant(<$cast>::from(v))
                }
            }

            impl From<Option<$t>> for SqlValue {
                fn from(v: Option<$t>) -> Self {
                    match v {
                        Some(v) => SqlValue::from(v),
                        None => SqlValue::Null(SqlType::$ty),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool as bool, Bool;
    i16 => Int as i64, Integer;
    i32 => Int as i64, Integer;
    i64 => Int as i64, Integer;
    u32 => Int as i64, Integer;
    f32 => Float as f64, Float;
    f64 => Float as f64, Float;
    String => Text as String, Text;
    &str => Text as String, Text;
    NaiveDateTime => Timestamp as NaiveDateTime, Timestamp;
    Vec<u8> => Bytes as Vec<u8>, Bytes;
}

/// Conversion from a decoded scalar into a concrete Rust type.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a scalar result type",
    note = "built-in types: bool, i32, i64, u64, f64, String, NaiveDateTime, Option<T>"
)]
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError>;

    /// Value to use when a scalar query matched no row. `None` means the
    /// type cannot represent absence.
    fn from_missing_row() -> Option<Self> {
        None
    }
}

fn mismatch(column: &str, expected: &'static str) -> DataError {
    DataError::TypeMismatch {
        column: column.to_string(),
        expected,
    }
}

fn unexpected_null(column: &str) -> DataError {
    DataError::UnexpectedNull(column.to_string())
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        match value {
            SqlValue::Int(i) => Ok(i),
            SqlValue::Null(_) => Err(unexpected_null(column)),
            _ => Err(mismatch(column, "i64")),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        let wide = i64::from_sql_value(value, column)?;
        i32::try_from(wide).map_err(|_| mismatch(column, "i32"))
    }
}

impl FromSqlValue for u64 {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        let wide = i64::from_sql_value(value, column)?;
        u64::try_from(wide).map_err(|_| mismatch(column, "u64"))
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        match value {
            SqlValue::Float(v) => Ok(v),
            SqlValue::Int(i) => Ok(i as f64),
            SqlValue::Null(_) => Err(unexpected_null(column)),
            _ => Err(mismatch(column, "f64")),
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        match value {
            SqlValue::Bool(b) => Ok(b),
            // SQLite and MySQL report booleans as integers.
            SqlValue::Int(0) => Ok(false),
            SqlValue::Int(1) => Ok(true),
            SqlValue::Null(_) => Err(unexpected_null(column)),
            _ => Err(mismatch(column, "bool")),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        match value {
            SqlValue::Text(s) => Ok(s),
            SqlValue::Null(_) => Err(unexpected_null(column)),
            _ => Err(mismatch(column, "String")),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        match value {
            SqlValue::Timestamp(ts) => Ok(ts),
            SqlValue::Null(_) => Err(unexpected_null(column)),
            _ => Err(mismatch(column, "NaiveDateTime")),
        }
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: SqlValue, _column: &str) -> Result<Self, DataError> {
        Ok(value)
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: SqlValue, column: &str) -> Result<Self, DataError> {
        match value {
            SqlValue::Null(_) => Ok(None),
            other => T::from_sql_value(other, column).map(Some),
        }
    }

    fn from_missing_row() -> Option<Self> {
        Some(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_become_typed_nulls() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null(SqlType::Integer));
        assert_eq!(SqlValue::from(None::<String>), SqlValue::Null(SqlType::Text));
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
        assert_eq!(SqlValue::from(7i32).sql_type(), SqlType::Integer);
    }

    #[test]
    fn scalar_coercion() {
        assert_eq!(i64::from_sql_value(SqlValue::Int(3), "c").unwrap(), 3);
        assert_eq!(f64::from_sql_value(SqlValue::Int(3), "c").unwrap(), 3.0);
        assert!(bool::from_sql_value(SqlValue::Int(1), "c").unwrap());
        assert_eq!(
            Option::<i64>::from_sql_value(SqlValue::Null(SqlType::Integer), "c").unwrap(),
            None
        );
    }

    #[test]
    fn scalar_coercion_failures() {
        assert!(matches!(
            i64::from_sql_value(SqlValue::Null(SqlType::Integer), "c"),
            Err(DataError::UnexpectedNull(_))
        ));
        assert!(matches!(
            String::from_sql_value(SqlValue::Int(1), "c"),
            Err(DataError::TypeMismatch { expected: "String", .. })
        ));
        assert!(matches!(
            u64::from_sql_value(SqlValue::Int(-1), "c"),
            Err(DataError::TypeMismatch { expected: "u64", .. })
        ));
    }
}

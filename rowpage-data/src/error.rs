/// Broad classification of a [`DataError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Driver, connectivity, malformed SQL or decoding failure.
    Execution,
    /// The caller broke an API contract (bad page size, bad identifier, ...).
    Contract,
    /// A mapper or SQL text was never registered.
    Configuration,
}

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    Database(Box<dyn std::error::Error + Send + Sync>),
    ColumnNotFound(String),
    UnexpectedNull(String),
    TypeMismatch { column: String, expected: &'static str },
    IncorrectResultSize { expected: usize, actual: usize },
    IncorrectColumnCount { expected: usize, actual: usize },
    Contract(String),
    Configuration(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `rowpage-data-sqlx`) to wrap
    /// driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        DataError::Contract(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        DataError::Configuration(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DataError::Database(_)
            | DataError::ColumnNotFound(_)
            | DataError::UnexpectedNull(_)
            | DataError::TypeMismatch { .. }
            | DataError::IncorrectResultSize { .. }
            | DataError::IncorrectColumnCount { .. } => ErrorKind::Execution,
            DataError::Contract(_) => ErrorKind::Contract,
            DataError::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::ColumnNotFound(col) => write!(f, "Column not found: {col}"),
            DataError::UnexpectedNull(col) => write!(f, "Unexpected NULL in column: {col}"),
            DataError::TypeMismatch { column, expected } => {
                write!(f, "Type mismatch for '{column}': expected {expected}")
            }
            DataError::IncorrectResultSize { expected, actual } => {
                write!(f, "Incorrect result size: expected {expected}, actual {actual}")
            }
            DataError::IncorrectColumnCount { expected, actual } => {
                write!(f, "Incorrect column count: expected {expected}, actual {actual}")
            }
            DataError::Contract(msg) => write!(f, "Contract violation: {msg}"),
            DataError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

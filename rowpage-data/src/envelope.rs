use crate::error::DataError;

/// Pass/fail wrapper returned by every repository operation.
///
/// `Error` never carries a payload. A single-row lookup that finds nothing is
/// `Ok(None)`, not an error.
#[derive(Debug)]
#[must_use]
pub enum Envelope<T> {
    Ok(T),
    Error(DataError),
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope::Ok(data)
    }

    pub fn error(cause: DataError) -> Self {
        Envelope::Error(cause)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Ok(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Ok(data) => Some(data),
            Envelope::Error(_) => None,
        }
    }

    pub fn cause(&self) -> Option<&DataError> {
        match self {
            Envelope::Ok(_) => None,
            Envelope::Error(cause) => Some(cause),
        }
    }

    pub fn into_result(self) -> Result<T, DataError> {
        self.into()
    }

    /// Transform the payload. An `Error` passes through and `f` is not called.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Envelope::Ok(data) => Envelope::Ok(f(data)),
            Envelope::Error(cause) => Envelope::Error(cause),
        }
    }

    /// Chain a fallible step. An `Error` passes through and `f` is not called.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Envelope<U>) -> Envelope<U> {
        match self {
            Envelope::Ok(data) => f(data),
            Envelope::Error(cause) => Envelope::Error(cause),
        }
    }
}

impl<T> From<Result<T, DataError>> for Envelope<T> {
    fn from(result: Result<T, DataError>) -> Self {
        match result {
            Ok(data) => Envelope::Ok(data),
            Err(cause) => Envelope::Error(cause),
        }
    }
}

impl<T> From<Envelope<T>> for Result<T, DataError> {
    fn from(envelope: Envelope<T>) -> Self {
        match envelope {
            Envelope::Ok(data) => Ok(data),
            Envelope::Error(cause) => Err(cause),
        }
    }
}

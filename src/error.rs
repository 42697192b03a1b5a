use thiserror::Error;

use crate::value::ColumnType;

/// Error type shared by every table operator
#[derive(Error, Debug)]
pub enum Error {
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("Inconsistent row width: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("Column type mismatch: column {name}, expected {expected:?}, found {found:?}")]
    ColumnTypeMismatch {
        name: String,
        expected: ColumnType,
        found: ColumnType,
    },

    #[error("Cast error: {0}")]
    Cast(String),

    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    #[error("Integer overflow: {0}")]
    Overflow(String),

    #[error("Index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid regular expression: {0}")]
    InvalidRegex(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),
}

/// Coarse classification of [`Error`] variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced column is absent or a schema is malformed
    Schema,
    /// A value or column has a type the operation cannot handle
    Type,
    /// Arithmetic failure
    Arithmetic,
    /// Caller supplied an invalid argument
    Input,
    /// Reading or writing external data failed
    Io,
    /// Engine configuration could not be loaded or is invalid
    Config,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ColumnNotFound(_)
            | Error::DuplicateColumnName(_)
            | Error::InconsistentRowCount { .. }
            | Error::Schema(_) => ErrorKind::Schema,
            Error::TypeMismatch { .. } | Error::ColumnTypeMismatch { .. } | Error::Cast(_) => {
                ErrorKind::Type
            }
            Error::DivisionByZero(_) | Error::Overflow(_) => ErrorKind::Arithmetic,
            Error::IndexOutOfBounds { .. } | Error::InvalidInput(_) | Error::InvalidRegex(_) => {
                ErrorKind::Input
            }
            Error::Io(_) | Error::Csv(_) | Error::Json(_) => ErrorKind::Io,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for `kind() == ErrorKind::Schema`
    pub fn is_schema_error(&self) -> bool {
        self.kind() == ErrorKind::Schema
    }

    /// Shorthand for `kind() == ErrorKind::Type`
    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }

    pub(crate) fn type_mismatch(
        context: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-level alias, re-exported from the root
pub type TablrsError = Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Error::InvalidRegex(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

///
/// Access-layer error types.
///
/// Every failure surfaced by a Session, Command, Cursor or Catalog is an
/// `Error`. Engine failures are translated by result code into the same
/// taxonomy the client-side checks use, and keep the extended engine code
/// for diagnostics (`Error::engine_code`). `Error::kind` gives the coarse
/// classification callers usually branch on.
///

use lightsql_value::CoercionError;
use rusqlite::ErrorCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    ConstraintViolation,
    Range,
    NotBound,
    State,
    LockedOrTimeout,
    Unsupported,
    Conversion,
    BatchPartialFailure,
    ReadOnly,
    Engine,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("SQL error: {message}")]
    Syntax { message: String, code: Option<i32> },

    #[error("constraint violation: {message}")]
    ConstraintViolation { message: String, code: i32 },

    #[error("{what} index {index} out of range (valid: 1..={max})")]
    Range {
        what: &'static str,
        index: usize,
        max: usize,
    },

    #[error("no such column: '{0}'")]
    NoSuchColumn(String),

    #[error("parameter {0} is not bound")]
    NotBound(usize),

    #[error("{0}")]
    State(String),

    #[error("database locked or timed out: {message}")]
    LockedOrTimeout { message: String, code: Option<i32> },

    #[error("not supported: {0}")]
    Unsupported(String),

    #[error("conversion failed: {0}")]
    Conversion(#[from] CoercionError),

    #[error("attempt to write in read-only mode: {message}")]
    ReadOnly { message: String, code: Option<i32> },

    #[error("{0}")]
    ResultShape(&'static str),

    #[error("batch stopped after {} item(s): {cause}", counts.len())]
    BatchPartialFailure { counts: Vec<i64>, cause: Box<Error> },

    #[error("engine error: {message}")]
    Engine { message: String, code: Option<i32> },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn state(message: impl Into<String>) -> Error {
        Error::State(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Error {
        Error::Unsupported(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Error::Range { .. } | Error::NoSuchColumn(_) => ErrorKind::Range,
            Error::NotBound(_) => ErrorKind::NotBound,
            Error::State(_) | Error::ResultShape(_) => ErrorKind::State,
            Error::LockedOrTimeout { .. } => ErrorKind::LockedOrTimeout,
            Error::Unsupported(_) => ErrorKind::Unsupported,
            Error::Conversion(_) => ErrorKind::Conversion,
            Error::BatchPartialFailure { .. } => ErrorKind::BatchPartialFailure,
            Error::ReadOnly { .. } => ErrorKind::ReadOnly,
            Error::Engine { .. } | Error::Config(_) | Error::Io(_) => ErrorKind::Engine,
        }
    }

    /// Extended engine result code, when the failure came from the engine.
    pub fn engine_code(&self) -> Option<i32> {
        match self {
            Error::ConstraintViolation { code, .. } => Some(*code),
            Error::Syntax { code, .. }
            | Error::LockedOrTimeout { code, .. }
            | Error::ReadOnly { code, .. }
            | Error::Engine { code, .. } => *code,
            Error::BatchPartialFailure { cause, .. } => cause.engine_code(),
            _ => None,
        }
    }

    /// Translates a failure raised while stepping a compiled statement.
    /// A generic engine error at that point is a runtime failure (overflow,
    /// a failed function call), not malformed SQL.
    pub(crate) fn from_step(err: rusqlite::Error) -> Error {
        match Error::from(err) {
            Error::Syntax { message, code } => Error::Engine { message, code },
            other => other,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(failure, message) => {
                let code = failure.extended_code;
                let message = message.unwrap_or_else(|| failure.to_string());
                match failure.code {
                    ErrorCode::ConstraintViolation => Error::ConstraintViolation { message, code },
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => Error::LockedOrTimeout {
                        message,
                        code: Some(code),
                    },
                    ErrorCode::OperationInterrupted => Error::LockedOrTimeout {
                        message: format!("query timed out or was interrupted ({message})"),
                        code: Some(code),
                    },
                    ErrorCode::ReadOnly => Error::ReadOnly {
                        message,
                        code: Some(code),
                    },
                    ErrorCode::ParameterOutOfRange => Error::Range {
                        what: "parameter",
                        index: 0,
                        max: 0,
                    },
                    // SQLITE_ERROR: malformed SQL, unknown tables or columns.
                    ErrorCode::Unknown if code & 0xff == rusqlite::ffi::SQLITE_ERROR => Error::Syntax {
                        message,
                        code: Some(code),
                    },
                    _ => Error::Engine {
                        message,
                        code: Some(code),
                    },
                }
            }
            rusqlite::Error::SqlInputError {
                error, msg, offset, ..
            } => Error::Syntax {
                message: format!("{msg} (at offset {offset})"),
                code: Some(error.extended_code),
            },
            rusqlite::Error::InvalidParameterCount(given, expected) => Error::Range {
                what: "parameter",
                index: given,
                max: expected,
            },
            rusqlite::Error::InvalidColumnIndex(index) => Error::Range {
                what: "column",
                index: index + 1,
                max: 0,
            },
            other => Error::Engine {
                message: other.to_string(),
                code: None,
            },
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

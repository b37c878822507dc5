///
/// Coercion failures.
///
/// Raised synchronously by the call that asked for the conversion; the
/// access layer wraps them into its own `Conversion` error kind.
///

use crate::coerce::SqlType;
use crate::value::StorageClass;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    #[error("cannot read a {from} value as {to}")]
    Unsupported { from: StorageClass, to: SqlType },

    #[error("value {value} is out of range for {to}")]
    OutOfRange { value: String, to: SqlType },

    #[error("bad value for type {to}: '{text}'")]
    Malformed { text: String, to: SqlType },

    #[error("unrecognized date/time text '{0}'")]
    UnrecognizedTemporal(String),

    #[error("column value is NULL; read it as Option<{0}>")]
    UnexpectedNull(SqlType),
}

///
/// # Requested-type coercion
///
/// A read is a pair (storage class of the stored value, type the caller
/// asked for). `rule` maps every such pair to one `Rule`; `coerce` then
/// performs the conversion the rule names. Adding a requested type means
/// adding a `SqlType` variant, its rows in `rule`, and its arm in
/// `coerce`; existing conversions are not touched.
///
/// | source  | numeric / boolean / decimal | text     | bytes   | temporal          |
/// |---------|-----------------------------|----------|---------|-------------------|
/// | NULL    | absent                      | absent   | absent  | absent            |
/// | INTEGER | convert                     | render   | reject  | epoch millis      |
/// | REAL    | convert                     | render   | reject  | Julian day        |
/// | TEXT    | parse                       | convert  | reject  | parse patterns    |
/// | BLOB    | reject                      | render   | convert | reject            |
///
/// Absent values come back as `Coerced::Null`; what a typed reader does
/// with that is decided by its `FromValue` impl. Numeric and boolean
/// readers yield their zero value, the rest require `Option<T>`.
///

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::error::CoercionError;
use crate::temporal::{self, TemporalConfig};
use crate::value::{ColumnValue, StorageClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Boolean,
    Text,
    Bytes,
    Decimal,
    Date,
    Time,
    Timestamp,
}

impl SqlType {
    pub const ALL: [SqlType; 13] = [
        SqlType::TinyInt,
        SqlType::SmallInt,
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::Float,
        SqlType::Double,
        SqlType::Boolean,
        SqlType::Text,
        SqlType::Bytes,
        SqlType::Decimal,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Text => "TEXT",
            SqlType::Bytes => "BYTES",
            SqlType::Decimal => "DECIMAL",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of a coercion; one variant per `SqlType` plus `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    Null,
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl Coerced {
    pub fn is_null(&self) -> bool {
        matches!(self, Coerced::Null)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Absent,
    Convert,
    ParseText,
    Render,
    Reject,
}

pub fn rule(from: StorageClass, to: SqlType) -> Rule {
    use StorageClass as S;
    match (from, to) {
        (S::Null, _) => Rule::Absent,

        (S::Blob, SqlType::Bytes) => Rule::Convert,
        (_, SqlType::Bytes) => Rule::Reject,

        (S::Text, SqlType::Text) => Rule::Convert,
        (_, SqlType::Text) => Rule::Render,

        (S::Blob, _) => Rule::Reject,
        (S::Text, _) => Rule::ParseText,
        (S::Integer | S::Real, _) => Rule::Convert,
    }
}

pub fn coerce(
    value: &ColumnValue,
    to: SqlType,
    config: &TemporalConfig,
) -> Result<Coerced, CoercionError> {
    match rule(value.storage_class(), to) {
        Rule::Absent => return Ok(Coerced::Null),
        Rule::Reject => {
            return Err(CoercionError::Unsupported {
                from: value.storage_class(),
                to,
            });
        }
        Rule::Convert | Rule::ParseText | Rule::Render => {}
    }

    Ok(match to {
        SqlType::TinyInt => Coerced::TinyInt(narrow(to_i64(value, to)?, to)?),
        SqlType::SmallInt => Coerced::SmallInt(narrow(to_i64(value, to)?, to)?),
        SqlType::Integer => Coerced::Integer(narrow(to_i64(value, to)?, to)?),
        SqlType::BigInt => Coerced::BigInt(to_i64(value, to)?),
        SqlType::Float => Coerced::Float(narrow_float(to_f64(value, to)?, to)?),
        SqlType::Double => Coerced::Double(to_f64(value, to)?),
        SqlType::Boolean => Coerced::Boolean(to_bool(value)?),
        SqlType::Text => Coerced::Text(render(value)),
        SqlType::Bytes => match value {
            ColumnValue::Blob(bytes) => Coerced::Bytes(bytes.clone()),
            other => return Err(mismatch(other, to)),
        },
        SqlType::Decimal => Coerced::Decimal(to_decimal(value)?),
        SqlType::Date => Coerced::Date(to_timestamp(value, to, config)?.date()),
        SqlType::Time => Coerced::Time(to_timestamp(value, to, config)?.time()),
        SqlType::Timestamp => Coerced::Timestamp(to_timestamp(value, to, config)?),
    })
}

/// Canonical text of a value. REAL uses the shortest round-trip form
/// and always shows it is not an integer (`1.0`, `1e20`).
pub fn render(value: &ColumnValue) -> String {
    match value {
        ColumnValue::Null => String::new(),
        ColumnValue::Integer(i) => i.to_string(),
        ColumnValue::Real(r) => format!("{r:?}"),
        ColumnValue::Text(t) => t.clone(),
        ColumnValue::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

fn narrow<T: TryFrom<i64>>(v: i64, to: SqlType) -> Result<T, CoercionError> {
    T::try_from(v).map_err(|_| CoercionError::OutOfRange {
        value: v.to_string(),
        to,
    })
}

/// Finite values beyond the f32 range fail rather than become infinite.
fn narrow_float(r: f64, to: SqlType) -> Result<f32, CoercionError> {
    if r.is_finite() && r.abs() > f64::from(f32::MAX) {
        return Err(CoercionError::OutOfRange {
            value: format!("{r:?}"),
            to,
        });
    }
    Ok(r as f32)
}

fn truncate(r: f64, to: SqlType) -> Result<i64, CoercionError> {
    let t = r.trunc();
    // i64::MAX as f64 rounds up to 2^63, which itself is out of range.
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Ok(t as i64)
    } else {
        Err(CoercionError::OutOfRange {
            value: format!("{r:?}"),
            to,
        })
    }
}

fn to_i64(value: &ColumnValue, to: SqlType) -> Result<i64, CoercionError> {
    match value {
        ColumnValue::Integer(i) => Ok(*i),
        ColumnValue::Real(r) => truncate(*r, to),
        ColumnValue::Text(t) => {
            let trimmed = t.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(i);
            }
            match trimmed.parse::<f64>() {
                Ok(r) if r.is_finite() => truncate(r, to),
                _ => Err(malformed(t, to)),
            }
        }
        other => Err(CoercionError::Unsupported {
            from: other.storage_class(),
            to,
        }),
    }
}

fn to_f64(value: &ColumnValue, to: SqlType) -> Result<f64, CoercionError> {
    match value {
        ColumnValue::Integer(i) => Ok(*i as f64),
        ColumnValue::Real(r) => Ok(*r),
        ColumnValue::Text(t) => t.trim().parse::<f64>().map_err(|_| malformed(t, to)),
        other => Err(CoercionError::Unsupported {
            from: other.storage_class(),
            to,
        }),
    }
}

fn to_bool(value: &ColumnValue) -> Result<bool, CoercionError> {
    match value {
        ColumnValue::Integer(i) => Ok(*i != 0),
        ColumnValue::Real(r) => Ok(*r != 0.0),
        ColumnValue::Text(t) => {
            let trimmed = t.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                trimmed
                    .parse::<f64>()
                    .map(|r| r != 0.0)
                    .map_err(|_| malformed(t, SqlType::Boolean))
            }
        }
        other => Err(CoercionError::Unsupported {
            from: other.storage_class(),
            to: SqlType::Boolean,
        }),
    }
}

fn to_decimal(value: &ColumnValue) -> Result<Decimal, CoercionError> {
    match value {
        ColumnValue::Integer(i) => Ok(Decimal::from(*i)),
        ColumnValue::Real(r) => Decimal::try_from(*r).map_err(|_| CoercionError::OutOfRange {
            value: format!("{r:?}"),
            to: SqlType::Decimal,
        }),
        ColumnValue::Text(t) => {
            let trimmed = t.trim();
            trimmed
                .parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|_| malformed(t, SqlType::Decimal))
        }
        other => Err(CoercionError::Unsupported {
            from: other.storage_class(),
            to: SqlType::Decimal,
        }),
    }
}

fn to_timestamp(
    value: &ColumnValue,
    to: SqlType,
    config: &TemporalConfig,
) -> Result<NaiveDateTime, CoercionError> {
    let out_of_range = |v: String| CoercionError::OutOfRange { value: v, to };
    match value {
        ColumnValue::Integer(ms) => {
            temporal::from_unix_millis(*ms).ok_or_else(|| out_of_range(ms.to_string()))
        }
        ColumnValue::Real(day) => {
            temporal::from_julian_day(*day, config).ok_or_else(|| out_of_range(format!("{day:?}")))
        }
        ColumnValue::Text(t) => {
            temporal::parse_text(t).ok_or_else(|| CoercionError::UnrecognizedTemporal(t.clone()))
        }
        other => Err(CoercionError::Unsupported {
            from: other.storage_class(),
            to,
        }),
    }
}

fn malformed(text: &str, to: SqlType) -> CoercionError {
    CoercionError::Malformed {
        text: text.to_string(),
        to,
    }
}

/// Typed reads of a column value.
pub trait FromValue: Sized {
    fn from_value(value: &ColumnValue, config: &TemporalConfig) -> Result<Self, CoercionError>;
}

fn mismatch(value: &ColumnValue, to: SqlType) -> CoercionError {
    CoercionError::Unsupported {
        from: value.storage_class(),
        to,
    }
}

macro_rules! from_value_or_zero {
    ($($ty:ty => $target:ident, $zero:expr;)*) => {
        $(impl FromValue for $ty {
            fn from_value(value: &ColumnValue, config: &TemporalConfig) -> Result<Self, CoercionError> {
                match coerce(value, SqlType::$target, config)? {
                    Coerced::$target(v) => Ok(v),
                    Coerced::Null => Ok($zero),
                    _ => Err(mismatch(value, SqlType::$target)),
                }
            }
        })*
    };
}

macro_rules! from_value_required {
    ($($ty:ty => $target:ident;)*) => {
        $(impl FromValue for $ty {
            fn from_value(value: &ColumnValue, config: &TemporalConfig) -> Result<Self, CoercionError> {
                match coerce(value, SqlType::$target, config)? {
                    Coerced::$target(v) => Ok(v),
                    Coerced::Null => Err(CoercionError::UnexpectedNull(SqlType::$target)),
                    _ => Err(mismatch(value, SqlType::$target)),
                }
            }
        })*
    };
}

from_value_or_zero! {
    i8 => TinyInt, 0;
    i16 => SmallInt, 0;
    i32 => Integer, 0;
    i64 => BigInt, 0;
    f32 => Float, 0.0;
    f64 => Double, 0.0;
    bool => Boolean, false;
}

from_value_required! {
    String => Text;
    Vec<u8> => Bytes;
    Decimal => Decimal;
    NaiveDate => Date;
    NaiveTime => Time;
    NaiveDateTime => Timestamp;
}

impl FromValue for ColumnValue {
    fn from_value(value: &ColumnValue, _config: &TemporalConfig) -> Result<Self, CoercionError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &ColumnValue, config: &TemporalConfig) -> Result<Self, CoercionError> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value, config).map(Some)
        }
    }
}

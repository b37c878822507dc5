///
/// Storage classes and the two value shapes that cross the engine boundary.
///
/// `ColumnValue` is what a column read produces: a tagged union over the
/// five storage classes. `ParamValue` is what callers bind: it carries
/// richer types (decimals, dates) that are lowered to one of the four
/// non-null storage classes right before the engine sees them.
///

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::temporal::{self, TemporalConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl StorageClass {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageClass::Null => "NULL",
            StorageClass::Integer => "INTEGER",
            StorageClass::Real => "REAL",
            StorageClass::Text => "TEXT",
            StorageClass::Blob => "BLOB",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value as the engine reported it for one column of one row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnValue {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ColumnValue {
    pub fn storage_class(&self) -> StorageClass {
        match self {
            ColumnValue::Null => StorageClass::Null,
            ColumnValue::Integer(_) => StorageClass::Integer,
            ColumnValue::Real(_) => StorageClass::Real,
            ColumnValue::Text(_) => StorageClass::Text,
            ColumnValue::Blob(_) => StorageClass::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

/// A typed value supplied for a parameter slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
}

impl ParamValue {
    /// Lowers the value to a storage class. Decimals keep their exact
    /// digits as text; temporal values follow `config.bind_encoding`.
    pub fn lower(&self, config: &TemporalConfig) -> ColumnValue {
        match self {
            ParamValue::Null => ColumnValue::Null,
            ParamValue::Integer(v) => ColumnValue::Integer(*v),
            ParamValue::Real(v) => ColumnValue::Real(*v),
            ParamValue::Text(v) => ColumnValue::Text(v.clone()),
            ParamValue::Blob(v) => ColumnValue::Blob(v.clone()),
            ParamValue::Decimal(d) => ColumnValue::Text(d.to_string()),
            ParamValue::Date(d) => temporal::encode(&d.and_time(NaiveTime::MIN), config),
            ParamValue::Time(t) => temporal::encode_time(t, config),
            ParamValue::Timestamp(ts) => temporal::encode(ts, config),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

macro_rules! param_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for ParamValue {
            fn from(v: $ty) -> Self {
                ParamValue::Integer(i64::from(v))
            }
        })*
    };
}

param_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Integer(if v { 1 } else { 0 })
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Real(f64::from(v))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Real(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<&[u8]> for ParamValue {
    fn from(v: &[u8]) -> Self {
        ParamValue::Blob(v.to_vec())
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(v: Vec<u8>) -> Self {
        ParamValue::Blob(v)
    }
}

impl From<Decimal> for ParamValue {
    fn from(v: Decimal) -> Self {
        ParamValue::Decimal(v)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(v: NaiveDate) -> Self {
        ParamValue::Date(v)
    }
}

impl From<NaiveTime> for ParamValue {
    fn from(v: NaiveTime) -> Self {
        ParamValue::Time(v)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(v: NaiveDateTime) -> Self {
        ParamValue::Timestamp(v)
    }
}

impl From<ColumnValue> for ParamValue {
    fn from(v: ColumnValue) -> Self {
        match v {
            ColumnValue::Null => ParamValue::Null,
            ColumnValue::Integer(i) => ParamValue::Integer(i),
            ColumnValue::Real(r) => ParamValue::Real(r),
            ColumnValue::Text(t) => ParamValue::Text(t),
            ColumnValue::Blob(b) => ParamValue::Blob(b),
        }
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ParamValue::Null, Into::into)
    }
}

/// Type affinity derived from a declared column type, following the
/// engine's rules: the first matching substring test wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affinity {
    Integer,
    Text,
    Blob,
    Real,
    Numeric,
}

impl Affinity {
    pub fn from_declared_type(declared: Option<&str>) -> Affinity {
        let Some(declared) = declared.filter(|d| !d.trim().is_empty()) else {
            return Affinity::Blob;
        };
        let upper = declared.to_ascii_uppercase();
        if upper.contains("INT") {
            Affinity::Integer
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|k| upper.contains(k)) {
            Affinity::Text
        } else if upper.contains("BLOB") {
            Affinity::Blob
        } else if ["REAL", "FLOA", "DOUB"].iter().any(|k| upper.contains(k)) {
            Affinity::Real
        } else {
            Affinity::Numeric
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Affinity::Integer => "INTEGER",
            Affinity::Text => "TEXT",
            Affinity::Blob => "BLOB",
            Affinity::Real => "REAL",
            Affinity::Numeric => "NUMERIC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_rules() {
        assert_eq!(Affinity::from_declared_type(Some("BIGINT")), Affinity::Integer);
        assert_eq!(Affinity::from_declared_type(Some("varchar(20)")), Affinity::Text);
        assert_eq!(Affinity::from_declared_type(Some("BLOB")), Affinity::Blob);
        assert_eq!(Affinity::from_declared_type(None), Affinity::Blob);
        assert_eq!(Affinity::from_declared_type(Some("DOUBLE PRECISION")), Affinity::Real);
        assert_eq!(Affinity::from_declared_type(Some("DECIMAL(10,5)")), Affinity::Numeric);
        // "INT" wins over "CHAR" because it is tested first.
        assert_eq!(Affinity::from_declared_type(Some("CHARINT")), Affinity::Integer);
    }

    #[test]
    fn test_param_lowering() {
        let config = TemporalConfig::default();
        assert_eq!(ParamValue::from(true).lower(&config), ColumnValue::Integer(1));
        assert_eq!(ParamValue::from(i32::MIN).lower(&config), ColumnValue::Integer(i32::MIN as i64));
        assert_eq!(ParamValue::from(None::<i32>).lower(&config), ColumnValue::Null);
        assert_eq!(
            ParamValue::from(Decimal::new(12345, 2)).lower(&config),
            ColumnValue::Text("123.45".to_string())
        );
        let day = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(ParamValue::from(day).lower(&config), ColumnValue::Integer(86_400_000));
    }

    #[test]
    fn test_storage_class_of_values() {
        assert_eq!(ColumnValue::Null.storage_class(), StorageClass::Null);
        assert_eq!(ColumnValue::Blob(vec![1]).storage_class(), StorageClass::Blob);
        assert!(ColumnValue::default().is_null());
    }
}

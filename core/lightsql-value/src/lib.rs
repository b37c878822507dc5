///
/// lightsql value layer
///
/// The engine stores every value under one of five storage classes and
/// attaches no fixed type to a column. Callers, on the other hand, ask
/// for a concrete type when they read. This crate sits between the two:
///
/// - `value`: storage classes, `ColumnValue` as read from the engine,
///   `ParamValue` as bound by callers, and declared-type affinity.
/// - `coerce`: the requested-type table. `coerce` turns a column value
///   into a `Coerced` result for a `SqlType`; `FromValue` is the typed
///   front end used by cursors.
/// - `temporal`: epoch/Julian-day/text conversions for dates, times
///   and timestamps, driven by `TemporalConfig`.
///
/// Everything here is pure; the engine binding lives in `lightsql`.
///

pub mod coerce;
pub mod error;
pub mod temporal;
pub mod value;

pub use coerce::{Coerced, FromValue, Rule, SqlType, coerce, rule};
pub use error::CoercionError;
pub use temporal::{BindEncoding, TemporalConfig};
pub use value::{Affinity, ColumnValue, ParamValue, StorageClass};

pub use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
pub use rust_decimal::Decimal;

///
/// Temporal conversions.
///
/// Dates, times and timestamps have no storage class of their own. A
/// stored temporal value is one of:
///
/// - INTEGER: milliseconds since 1970-01-01T00:00:00Z
/// - REAL: a Julian-day style day count, interpreted against
///   `TemporalConfig::julian_day_epoch` (the day number of the Unix epoch)
/// - TEXT: one of the patterns in `TEXT_PATTERNS`, tried in order
///
/// All values are UTC; no local time zone is ever consulted.
///

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::ColumnValue;

pub const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Julian day number of 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindEncoding {
    #[default]
    UnixMillis,
    JulianDay,
    Iso8601,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    pub julian_day_epoch: f64,
    pub bind_encoding: BindEncoding,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            julian_day_epoch: UNIX_EPOCH_JULIAN_DAY,
            bind_encoding: BindEncoding::UnixMillis,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    WithOffset,
    DateTime,
    Date,
    Time,
}

/// Text patterns in the order they are tried. Offset forms come first so
/// that a trailing zone is never silently dropped by a shorter pattern.
const TEXT_PATTERNS: &[(&str, Shape)] = &[
    ("%Y-%m-%dT%H:%M:%S%.f%:z", Shape::WithOffset),
    ("%Y-%m-%d %H:%M:%S%.f%:z", Shape::WithOffset),
    ("%Y-%m-%dT%H:%M%:z", Shape::WithOffset),
    ("%Y-%m-%d %H:%M%:z", Shape::WithOffset),
    ("%Y-%m-%dT%H:%M:%S%.f", Shape::DateTime),
    ("%Y-%m-%d %H:%M:%S%.f", Shape::DateTime),
    ("%Y-%m-%dT%H:%M", Shape::DateTime),
    ("%Y-%m-%d %H:%M", Shape::DateTime),
    ("%Y-%m-%d", Shape::Date),
    ("%H:%M:%S%.f", Shape::Time),
    ("%H:%M", Shape::Time),
];

/// Parses temporal text into a UTC timestamp. Time-only text lands on
/// 1970-01-01; date-only text lands on midnight.
pub fn parse_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    let normalized;
    let text = match text.strip_suffix(['Z', 'z']) {
        Some(head) => {
            normalized = format!("{head}+00:00");
            normalized.as_str()
        }
        None => text,
    };

    TEXT_PATTERNS.iter().find_map(|(format, shape)| match shape {
        Shape::WithOffset => DateTime::parse_from_str(text, format)
            .ok()
            .map(|dt| dt.naive_utc()),
        Shape::DateTime => NaiveDateTime::parse_from_str(text, format).ok(),
        Shape::Date => NaiveDate::parse_from_str(text, format)
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN)),
        Shape::Time => NaiveTime::parse_from_str(text, format)
            .ok()
            .map(|t| unix_epoch_date().and_time(t)),
    })
}

pub fn from_unix_millis(millis: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

pub fn to_unix_millis(ts: &NaiveDateTime) -> i64 {
    ts.and_utc().timestamp_millis()
}

pub fn from_julian_day(day: f64, config: &TemporalConfig) -> Option<NaiveDateTime> {
    let millis = ((day - config.julian_day_epoch) * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return None;
    }
    from_unix_millis(millis as i64)
}

pub fn to_julian_day(ts: &NaiveDateTime, config: &TemporalConfig) -> f64 {
    to_unix_millis(ts) as f64 / MILLIS_PER_DAY + config.julian_day_epoch
}

pub fn encode(ts: &NaiveDateTime, config: &TemporalConfig) -> ColumnValue {
    match config.bind_encoding {
        BindEncoding::UnixMillis => ColumnValue::Integer(to_unix_millis(ts)),
        BindEncoding::JulianDay => ColumnValue::Real(to_julian_day(ts, config)),
        BindEncoding::Iso8601 => ColumnValue::Text(ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()),
    }
}

pub fn encode_time(time: &NaiveTime, config: &TemporalConfig) -> ColumnValue {
    match config.bind_encoding {
        BindEncoding::Iso8601 => ColumnValue::Text(time.format("%H:%M:%S%.3f").to_string()),
        _ => encode(&unix_epoch_date().and_time(*time), config),
    }
}

fn unix_epoch_date() -> NaiveDate {
    // NaiveDate's default is 1970-01-01.
    NaiveDate::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    #[test]
    fn test_parse_text_patterns() {
        assert_eq!(parse_text("2024-03-05"), Some(ts(2024, 3, 5, 0, 0, 0, 0)));
        assert_eq!(parse_text("2024-03-05 10:11"), Some(ts(2024, 3, 5, 10, 11, 0, 0)));
        assert_eq!(parse_text("2024-03-05T10:11:12"), Some(ts(2024, 3, 5, 10, 11, 12, 0)));
        assert_eq!(
            parse_text("2024-03-05 10:11:12.345"),
            Some(ts(2024, 3, 5, 10, 11, 12, 345))
        );
        assert_eq!(parse_text("10:11"), Some(ts(1970, 1, 1, 10, 11, 0, 0)));
        assert_eq!(parse_text("10:11:12.5"), Some(ts(1970, 1, 1, 10, 11, 12, 500)));
    }

    #[test]
    fn test_parse_text_offsets_normalize_to_utc() {
        assert_eq!(parse_text("2024-03-05T10:11:12Z"), Some(ts(2024, 3, 5, 10, 11, 12, 0)));
        assert_eq!(
            parse_text("2024-03-05T10:11:12+02:00"),
            Some(ts(2024, 3, 5, 8, 11, 12, 0))
        );
        assert_eq!(parse_text("2024-03-05 00:30-01:00"), Some(ts(2024, 3, 5, 1, 30, 0, 0)));
    }

    #[test]
    fn test_parse_text_rejects_garbage() {
        assert_eq!(parse_text("yesterday"), None);
        assert_eq!(parse_text("2024-13-01"), None);
        assert_eq!(parse_text(""), None);
    }

    #[test]
    fn test_julian_day_baseline() {
        let config = TemporalConfig::default();
        assert_eq!(from_julian_day(2_440_587.5, &config), Some(ts(1970, 1, 1, 0, 0, 0, 0)));
        assert_eq!(from_julian_day(2_440_588.0, &config), Some(ts(1970, 1, 1, 12, 0, 0, 0)));
        assert_eq!(to_julian_day(&ts(1970, 1, 2, 0, 0, 0, 0), &config), 2_440_588.5);

        let shifted = TemporalConfig {
            julian_day_epoch: 0.0,
            ..TemporalConfig::default()
        };
        assert_eq!(from_julian_day(1.0, &shifted), Some(ts(1970, 1, 2, 0, 0, 0, 0)));
        assert_eq!(from_julian_day(f64::NAN, &shifted), None);
    }

    #[test]
    fn test_encode_follows_bind_encoding() {
        let moment = ts(1970, 1, 1, 0, 0, 1, 500);
        let mut config = TemporalConfig::default();
        assert_eq!(encode(&moment, &config), ColumnValue::Integer(1500));
        config.bind_encoding = BindEncoding::Iso8601;
        assert_eq!(
            encode(&moment, &config),
            ColumnValue::Text("1970-01-01 00:00:01.500".to_string())
        );
        config.bind_encoding = BindEncoding::JulianDay;
        assert!(matches!(encode(&moment, &config), ColumnValue::Real(_)));
    }
}

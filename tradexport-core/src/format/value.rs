//! Tagged field values and their locale-independent text rendering.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Calendar date format for rendered timestamps (always UTC).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Decimal,
    Timestamp,
}

/// One field's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Text(String),
    Decimal(Decimal),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Parse a cell of the given kind.
    ///
    /// Timestamps accept epoch milliseconds or [`DATE_FORMAT`].
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Value, String> {
        let raw = raw.trim();
        match kind {
            ValueKind::Text => Ok(Value::Text(raw.to_string())),
            ValueKind::Decimal => Decimal::from_str(raw)
                .map(Value::Decimal)
                .map_err(|e| format!("invalid decimal '{raw}': {e}")),
            ValueKind::Timestamp => parse_timestamp(raw).map(Value::Timestamp),
        }
    }
}

/// Epoch milliseconds to a UTC timestamp.
pub fn timestamp_from_millis(ms: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| format!("timestamp out of range: {ms}"))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ms) = raw.parse::<i64>() {
        return timestamp_from_millis(ms);
    }
    NaiveDateTime::parse_from_str(raw, DATE_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| format!("invalid timestamp '{raw}': {e}"))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Decimal(d) => write!(f, "{}", d.normalize()),
            Value::Timestamp(t) => write!(f, "{}", t.format(DATE_FORMAT)),
        }
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_render_without_trailing_zeros() {
        let v = Value::parse(ValueKind::Decimal, "0.00100000").unwrap();
        assert_eq!(v.to_string(), "0.001");
        let v = Value::parse(ValueKind::Decimal, "42.000").unwrap();
        assert_eq!(v.to_string(), "42");
    }

    #[test]
    fn small_decimals_never_use_exponent() {
        let v = Value::parse(ValueKind::Decimal, "0.00000001").unwrap();
        assert_eq!(v.to_string(), "0.00000001");
    }

    #[test]
    fn timestamp_parses_epoch_millis_and_date_format() {
        let a = Value::parse(ValueKind::Timestamp, "1704067200000").unwrap();
        let b = Value::parse(ValueKind::Timestamp, "2024-01-01 00:00:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "2024-01-01 00:00:00");
    }

    #[test]
    fn invalid_cells_are_rejected() {
        assert!(Value::parse(ValueKind::Decimal, "1,5").is_err());
        assert!(Value::parse(ValueKind::Timestamp, "yesterday").is_err());
    }

    #[test]
    fn text_is_trimmed_but_otherwise_verbatim() {
        let v = Value::parse(ValueKind::Text, "  BTC-USDT ").unwrap();
        assert_eq!(v.as_text(), Some("BTC-USDT"));
    }
}

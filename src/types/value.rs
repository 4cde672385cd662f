//! Typed values produced by the value codec.

use crate::backend::LobLocator;
use crate::codec::date::is_zero_timestamp;
use bytes::Bytes;
use chrono::NaiveDateTime;
use std::fmt;

/// A decoded column value.
///
/// This is the closed tagged union the codec fills from vendor-native
/// payloads. Large objects stay as locator references and are never
/// materialized here; use `Row::lob` for streaming access or
/// `Row::bytes`/`Row::text` to buffer the content.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// SQL NULL.
    Null,
    /// Integral numeric value that fits a signed 64-bit integer.
    Integer(i64),
    /// Numeric value with a fractional part, or one too large for `i64`.
    Float(f64),
    /// Text value (VARCHAR2, CHAR, LONG, inline CLOB).
    Text(String),
    /// Raw binary value (RAW, inline BLOB).
    Bytes(Bytes),
    /// Date/time value.
    Timestamp(NaiveDateTime),
    /// Out-of-line large object reference.
    Lob(LobLocator),
}

impl TypedValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// Try to get the value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get the value as an f64. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(v) => Some(*v),
            TypedValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Try to get the value as raw bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TypedValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get the value as a timestamp.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            TypedValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Try to get the value as a LOB locator.
    pub fn as_lob(&self) -> Option<&LobLocator> {
        match self {
            TypedValue::Lob(loc) => Some(loc),
            _ => None,
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => write!(f, "NULL"),
            TypedValue::Integer(v) => write!(f, "{}", v),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Text(s) => write!(f, "{}", s),
            TypedValue::Bytes(b) => write!(f, "<RAW: {} bytes>", b.len()),
            TypedValue::Timestamp(ts) => {
                if is_zero_timestamp(ts) {
                    write!(f, "<zero date>")
                } else {
                    write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S"))
                }
            }
            TypedValue::Lob(loc) => write!(f, "<LOB: {} bytes>", loc.size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null() {
        let val = TypedValue::Null;
        assert!(val.is_null());
        assert_eq!(val.as_str(), None);
        assert_eq!(format!("{}", val), "NULL");
    }

    #[test]
    fn test_integer() {
        let val = TypedValue::Integer(42);
        assert_eq!(val.as_i64(), Some(42));
        assert_eq!(val.as_f64(), Some(42.0));
        assert_eq!(format!("{}", val), "42");
    }

    #[test]
    fn test_float_does_not_narrow() {
        let val = TypedValue::Float(123.45);
        assert_eq!(val.as_i64(), None);
        assert_eq!(val.as_f64(), Some(123.45));
    }

    #[test]
    fn test_text() {
        let val = TypedValue::Text("hello".to_string());
        assert!(!val.is_null());
        assert_eq!(val.as_str(), Some("hello"));
    }
}

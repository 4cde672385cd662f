//! Value codec: vendor-native payloads to typed values and back.
//!
//! Decoding is driven by the declared column type. Encoding converts
//! caller-supplied bind parameters into the vendor representation before
//! they are handed to the backend.

pub mod date;
pub mod number;

use crate::backend::NativeValue;
use crate::error::{Error, Result};
use crate::types::{Column, OracleType, TypedValue};
use bytes::Bytes;
use chrono::NaiveDateTime;

/// Decode one column value from its vendor representation.
///
/// NUMBER payloads are tried as `i64` first and fall back to `f64` only
/// when the integer parse fails; the wire bytes are identical for both, so
/// the order is what keeps exact integers exact. A failure names the column
/// and the attempted target and leaves other columns of the row untouched.
pub fn decode_column(native: &NativeValue, column: &Column) -> Result<TypedValue> {
    let payload = match native {
        NativeValue::Null => return Ok(TypedValue::Null),
        NativeValue::Lob(locator) => return Ok(TypedValue::Lob(locator.clone())),
        NativeValue::Bytes(b) => b,
    };

    match &column.data_type {
        OracleType::Varchar2 { .. }
        | OracleType::Char { .. }
        | OracleType::Long
        | OracleType::Clob => {
            let text = std::str::from_utf8(payload)
                .map_err(|_| Error::conversion(&column.name, "String"))?;
            Ok(TypedValue::Text(text.to_string()))
        }
        OracleType::Number { .. } | OracleType::BinaryInteger => {
            let decimal = number::decode_number(payload)?;
            if let Ok(v) = decimal.parse::<i64>() {
                return Ok(TypedValue::Integer(v));
            }
            let v = decimal
                .parse::<f64>()
                .map_err(|_| Error::conversion(&column.name, "f64"))?;
            Ok(TypedValue::Float(v))
        }
        OracleType::Date => Ok(TypedValue::Timestamp(date::decode_date(payload)?)),
        OracleType::Raw { .. } | OracleType::Blob => Ok(TypedValue::Bytes(payload.clone())),
    }
}

/// A caller-supplied bind parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// SQL NULL.
    Null,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// Text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Date/time.
    Timestamp(NaiveDateTime),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
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

impl From<Vec<u8>> for ParamValue {
    fn from(v: Vec<u8>) -> Self {
        ParamValue::Bytes(v)
    }
}

impl From<NaiveDateTime> for ParamValue {
    fn from(v: NaiveDateTime) -> Self {
        ParamValue::Timestamp(v)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => ParamValue::Null,
        }
    }
}

/// Encode a bind parameter into the vendor representation.
pub fn encode_param(param: &ParamValue) -> Result<NativeValue> {
    Ok(match param {
        ParamValue::Null => NativeValue::Null,
        ParamValue::Int(v) => NativeValue::Bytes(Bytes::from(number::encode_i64(*v))),
        ParamValue::Float(v) => NativeValue::Bytes(Bytes::from(number::encode_f64(*v)?)),
        ParamValue::Text(s) => NativeValue::Bytes(Bytes::copy_from_slice(s.as_bytes())),
        ParamValue::Bytes(b) => NativeValue::Bytes(Bytes::copy_from_slice(b)),
        ParamValue::Timestamp(ts) => NativeValue::Bytes(Bytes::from(date::encode_date(ts)?.to_vec())),
    })
}

/// Strongly-typed scan path out of a [`TypedValue`].
///
/// The NULL policy follows the generic client contract: text destinations
/// see the empty string, timestamp destinations see the zero timestamp, and
/// `Option<T>` sees `None`. Numeric and binary destinations refuse NULL
/// rather than inventing a zero; use `Option<T>` for nullable columns.
pub trait FromValue: Sized {
    /// Name of the target type, used in conversion errors.
    const TARGET: &'static str;

    /// Convert a decoded value; `column` names the source for errors.
    fn from_value(value: &TypedValue, column: &str) -> Result<Self>;
}

impl FromValue for i64 {
    const TARGET: &'static str = "i64";

    fn from_value(value: &TypedValue, column: &str) -> Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| Error::conversion(column, Self::TARGET))
    }
}

impl FromValue for f64 {
    const TARGET: &'static str = "f64";

    fn from_value(value: &TypedValue, column: &str) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::conversion(column, Self::TARGET))
    }
}

impl FromValue for bool {
    const TARGET: &'static str = "bool";

    fn from_value(value: &TypedValue, column: &str) -> Result<Self> {
        match value.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(Error::conversion(column, Self::TARGET)),
        }
    }
}

impl FromValue for String {
    const TARGET: &'static str = "String";

    fn from_value(value: &TypedValue, column: &str) -> Result<Self> {
        match value {
            TypedValue::Null => Ok(String::new()),
            TypedValue::Text(s) => Ok(s.clone()),
            _ => Err(Error::conversion(column, Self::TARGET)),
        }
    }
}

impl FromValue for Vec<u8> {
    const TARGET: &'static str = "Vec<u8>";

    fn from_value(value: &TypedValue, column: &str) -> Result<Self> {
        value
            .as_bytes()
            .map(|b| b.to_vec())
            .ok_or_else(|| Error::conversion(column, Self::TARGET))
    }
}

impl FromValue for NaiveDateTime {
    const TARGET: &'static str = "NaiveDateTime";

    fn from_value(value: &TypedValue, column: &str) -> Result<Self> {
        match value {
            TypedValue::Null => Ok(date::zero_timestamp()),
            TypedValue::Timestamp(ts) => Ok(*ts),
            _ => Err(Error::conversion(column, Self::TARGET)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    const TARGET: &'static str = T::TARGET;

    fn from_value(value: &TypedValue, column: &str) -> Result<Self> {
        match value {
            TypedValue::Null => Ok(None),
            other => T::from_value(other, column).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oracle_type::{
        TYPE_NUM_DATE, TYPE_NUM_NUMBER, TYPE_NUM_RAW, TYPE_NUM_VARCHAR,
    };

    fn column(name: &str, type_num: u8) -> Column {
        Column {
            name: name.to_string(),
            nullable: true,
            data_type: OracleType::from_raw(type_num, 0, 0, 4000).unwrap(),
        }
    }

    #[test]
    fn test_decode_number_integer_first() {
        let col = column("N", TYPE_NUM_NUMBER);
        let native = NativeValue::Bytes(Bytes::from(number::encode_i64(1234567890)));
        assert_eq!(
            decode_column(&native, &col).unwrap(),
            TypedValue::Integer(1234567890)
        );
    }

    #[test]
    fn test_decode_number_float_fallback() {
        let col = column("N", TYPE_NUM_NUMBER);
        let native = NativeValue::Bytes(Bytes::from(number::encode_number("0.5").unwrap()));
        assert_eq!(decode_column(&native, &col).unwrap(), TypedValue::Float(0.5));
    }

    #[test]
    fn test_decode_multibyte_text_round_trip() {
        let text = "árvíztűrő tükörfúrógép";
        let col = column("S", TYPE_NUM_VARCHAR);
        let native = NativeValue::Bytes(Bytes::copy_from_slice(text.as_bytes()));
        assert_eq!(
            decode_column(&native, &col).unwrap(),
            TypedValue::Text(text.to_string())
        );
    }

    #[test]
    fn test_decode_raw_is_bytes_not_text() {
        let col = column("R", TYPE_NUM_RAW);
        let native = NativeValue::Bytes(Bytes::from_static(&[0x00]));
        assert_eq!(
            decode_column(&native, &col).unwrap(),
            TypedValue::Bytes(Bytes::from_static(&[0x00]))
        );
    }

    #[test]
    fn test_decode_null() {
        let col = column("D", TYPE_NUM_DATE);
        assert!(decode_column(&NativeValue::Null, &col).unwrap().is_null());
    }

    #[test]
    fn test_null_policy_typed_destinations() {
        assert_eq!(String::from_value(&TypedValue::Null, "S").unwrap(), "");
        let ts = NaiveDateTime::from_value(&TypedValue::Null, "D").unwrap();
        assert!(date::is_zero_timestamp(&ts));
        assert_eq!(
            Option::<i64>::from_value(&TypedValue::Null, "N").unwrap(),
            None
        );
        assert!(i64::from_value(&TypedValue::Null, "N").is_err());
    }

    #[test]
    fn test_conversion_error_names_column_and_target() {
        let err = i64::from_value(&TypedValue::Text("x".into()), "AMOUNT").unwrap_err();
        match err {
            Error::Conversion { column, target } => {
                assert_eq!(column, "AMOUNT");
                assert_eq!(target, "i64");
            }
            other => panic!("expected Conversion error, got {other}"),
        }
    }

    #[test]
    fn test_encode_param_round_trip() {
        let col = column("N", TYPE_NUM_NUMBER);
        let native = encode_param(&ParamValue::Int(1234567890123)).unwrap();
        assert_eq!(
            decode_column(&native, &col).unwrap(),
            TypedValue::Integer(1234567890123)
        );
    }
}

//! Oracle data type enum with type-specific attributes.
//!
//! Nullability is a column property, not a type property.

use crate::error::{Error, Result};

/// Vendor type number for VARCHAR2.
pub const TYPE_NUM_VARCHAR: u8 = 1;
/// Vendor type number for NUMBER.
pub const TYPE_NUM_NUMBER: u8 = 2;
/// Vendor type number for BINARY_INTEGER.
pub const TYPE_NUM_BINARY_INTEGER: u8 = 3;
/// Vendor type number for LONG.
pub const TYPE_NUM_LONG: u8 = 8;
/// Vendor type number for DATE.
pub const TYPE_NUM_DATE: u8 = 12;
/// Vendor type number for RAW.
pub const TYPE_NUM_RAW: u8 = 23;
/// Vendor type number for CHAR.
pub const TYPE_NUM_CHAR: u8 = 96;
/// Vendor type number for CLOB.
pub const TYPE_NUM_CLOB: u8 = 112;
/// Vendor type number for BLOB.
pub const TYPE_NUM_BLOB: u8 = 113;

/// Oracle data type with type-specific attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum OracleType {
    /// VARCHAR2(max_size) - variable-length string.
    Varchar2 { max_size: u32 },
    /// NUMBER(precision, scale) - numeric type.
    Number { precision: i8, scale: i8 },
    /// BINARY_INTEGER - integer type.
    BinaryInteger,
    /// LONG - legacy large text type.
    Long,
    /// RAW(max_size) - raw binary type.
    Raw { max_size: u32 },
    /// CHAR(size) - fixed-length string.
    Char { max_size: u32 },
    /// DATE - date/time (no timezone).
    Date,
    /// CLOB - Character Large Object.
    Clob,
    /// BLOB - Binary Large Object.
    Blob,
}

impl OracleType {
    /// Create from a raw vendor type number and column metadata.
    ///
    /// Returns a prepare-level error for types the adapter does not handle.
    pub fn from_raw(type_num: u8, precision: i8, scale: i8, max_size: u32) -> Result<Self> {
        match type_num {
            TYPE_NUM_VARCHAR => Ok(OracleType::Varchar2 { max_size }),
            TYPE_NUM_NUMBER => Ok(OracleType::Number { precision, scale }),
            TYPE_NUM_BINARY_INTEGER => Ok(OracleType::BinaryInteger),
            TYPE_NUM_LONG => Ok(OracleType::Long),
            TYPE_NUM_RAW => Ok(OracleType::Raw { max_size }),
            TYPE_NUM_CHAR => Ok(OracleType::Char { max_size }),
            TYPE_NUM_DATE => Ok(OracleType::Date),
            TYPE_NUM_CLOB => Ok(OracleType::Clob),
            TYPE_NUM_BLOB => Ok(OracleType::Blob),
            _ => Err(Error::invalid_payload(
                "column descriptor",
                format!("unsupported vendor type number {type_num}"),
            )),
        }
    }

    /// Get the vendor type number.
    pub fn type_num(&self) -> u8 {
        match self {
            OracleType::Varchar2 { .. } => TYPE_NUM_VARCHAR,
            OracleType::Number { .. } => TYPE_NUM_NUMBER,
            OracleType::BinaryInteger => TYPE_NUM_BINARY_INTEGER,
            OracleType::Long => TYPE_NUM_LONG,
            OracleType::Raw { .. } => TYPE_NUM_RAW,
            OracleType::Char { .. } => TYPE_NUM_CHAR,
            OracleType::Date => TYPE_NUM_DATE,
            OracleType::Clob => TYPE_NUM_CLOB,
            OracleType::Blob => TYPE_NUM_BLOB,
        }
    }

    /// Whether values of this type arrive out-of-line as LOB locators.
    pub fn is_lob(&self) -> bool {
        matches!(self, OracleType::Clob | OracleType::Blob)
    }

    /// Whether this is a text type (inline payloads are UTF-8).
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            OracleType::Varchar2 { .. } | OracleType::Char { .. } | OracleType::Long
        )
    }
}

impl std::fmt::Display for OracleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleType::Varchar2 { max_size } => write!(f, "VARCHAR2({})", max_size),
            OracleType::Number { precision, scale } => {
                if *precision == 0 && *scale == 0 {
                    write!(f, "NUMBER")
                } else if *scale == 0 {
                    write!(f, "NUMBER({})", precision)
                } else {
                    write!(f, "NUMBER({},{})", precision, scale)
                }
            }
            OracleType::BinaryInteger => write!(f, "BINARY_INTEGER"),
            OracleType::Long => write!(f, "LONG"),
            OracleType::Raw { max_size } => write!(f, "RAW({})", max_size),
            OracleType::Char { max_size } => write!(f, "CHAR({})", max_size),
            OracleType::Date => write!(f, "DATE"),
            OracleType::Clob => write!(f, "CLOB"),
            OracleType::Blob => write!(f, "BLOB"),
        }
    }
}

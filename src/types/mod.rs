//! Typed values, column descriptors and rows.

pub mod column;
pub mod oracle_type;
pub mod row;
pub mod value;

pub use column::{Column, ColumnInfo};
pub use oracle_type::OracleType;
pub use row::Row;
pub use value::TypedValue;

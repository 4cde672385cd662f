//! Column and ColumnInfo types for the user-facing API.
//!
//! Derived from the raw column descriptors the backend reports at execute
//! time.

use crate::backend::ColumnDesc;
use crate::error::Result;

use super::oracle_type::OracleType;

/// A column in a result set.
#[derive(Debug, Clone)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Whether NULL values are allowed.
    pub nullable: bool,
    /// Column data type.
    pub data_type: OracleType,
}

impl Column {
    /// Create a column from a backend descriptor.
    ///
    /// Returns an error if the vendor type is not supported.
    pub fn from_desc(desc: &ColumnDesc) -> Result<Self> {
        Ok(Self {
            name: desc.name.clone(),
            nullable: desc.nullable,
            data_type: OracleType::from_raw(
                desc.type_num,
                desc.precision,
                desc.scale,
                desc.max_size,
            )?,
        })
    }
}

/// Shared column information for all rows in a result set.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    /// Column definitions, in declared order.
    pub columns: Vec<Column>,
}

impl ColumnInfo {
    /// Create new column info from columns.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Create column info from backend descriptors.
    pub fn from_descs(descs: &[ColumnDesc]) -> Result<Self> {
        let columns: Result<Vec<Column>> = descs.iter().map(Column::from_desc).collect();
        Ok(Self { columns: columns? })
    }

    /// Get column names in declared order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get column by index.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find column index by name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let name_upper = name.to_uppercase();
        self.columns
            .iter()
            .position(|c| c.name.to_uppercase() == name_upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::oracle_type::{TYPE_NUM_NUMBER, TYPE_NUM_VARCHAR};

    fn make_test_descs() -> Vec<ColumnDesc> {
        vec![
            ColumnDesc {
                name: "ID".to_string(),
                type_num: TYPE_NUM_NUMBER,
                precision: 10,
                scale: 0,
                max_size: 22,
                nullable: false,
            },
            ColumnDesc {
                name: "NAME".to_string(),
                type_num: TYPE_NUM_VARCHAR,
                precision: 0,
                scale: 0,
                max_size: 100,
                nullable: true,
            },
        ]
    }

    #[test]
    fn test_column_from_desc() {
        let desc = &make_test_descs()[0];
        let col = Column::from_desc(desc).unwrap();

        assert_eq!(col.name, "ID");
        assert!(!col.nullable);
        if let OracleType::Number { precision, scale } = col.data_type {
            assert_eq!(precision, 10);
            assert_eq!(scale, 0);
        } else {
            panic!("Expected Number type");
        }
    }

    #[test]
    fn test_column_info_lookup() {
        let info = ColumnInfo::from_descs(&make_test_descs()).unwrap();

        assert_eq!(info.len(), 2);
        assert_eq!(info.column_names(), vec!["ID", "NAME"]);
        assert_eq!(info.find_by_name("name"), Some(1));
        assert_eq!(info.find_by_name("UNKNOWN"), None);
    }
}

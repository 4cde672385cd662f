//! Row type for query results.

use std::fmt;
use std::sync::Arc;

use crate::codec::FromValue;
use crate::error::{Error, Result};
use crate::lob::LobReader;
use crate::session::SessionHandle;
use bytes::Bytes;

use super::column::{Column, ColumnInfo};
use super::value::TypedValue;

/// A row of query results.
///
/// Values sit in declared column order. Scanning goes through the typed
/// [`decode`](Self::decode) path or the raw [`get`](Self::get) accessor;
/// LOB columns hand out streaming readers via [`lob`](Self::lob) and are
/// buffered on demand by [`bytes`](Self::bytes) / [`text`](Self::text).
#[derive(Clone)]
pub struct Row {
    values: Vec<TypedValue>,
    column_info: Arc<ColumnInfo>,
    session: SessionHandle,
    lob_chunk_size: u32,
}

impl Row {
    pub(crate) fn new(
        values: Vec<TypedValue>,
        column_info: Arc<ColumnInfo>,
        session: SessionHandle,
        lob_chunk_size: u32,
    ) -> Self {
        Self {
            values,
            column_info,
            session,
            lob_chunk_size,
        }
    }

    /// Get value by column index (0-based).
    pub fn get(&self, index: usize) -> Option<&TypedValue> {
        self.values.get(index)
    }

    /// Get value by column name (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&TypedValue> {
        self.column_info
            .find_by_name(name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get all values.
    pub fn values(&self) -> &[TypedValue] {
        &self.values
    }

    /// Get column information.
    pub fn columns(&self) -> &[Column] {
        &self.column_info.columns
    }

    /// Get column names in declared order.
    pub fn column_names(&self) -> Vec<&str> {
        self.column_info.column_names()
    }

    fn column_at(&self, index: usize, target: &'static str) -> Result<&Column> {
        self.column_info
            .get(index)
            .ok_or_else(|| Error::conversion(format!("#{index}"), target))
    }

    /// Decode the value at `index` into a typed destination.
    pub fn decode<T: FromValue>(&self, index: usize) -> Result<T> {
        let column = self.column_at(index, T::TARGET)?;
        T::from_value(&self.values[index], &column.name)
    }

    /// Decode the value for a named column into a typed destination.
    pub fn decode_by_name<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self
            .column_info
            .find_by_name(name)
            .ok_or_else(|| Error::conversion(name, T::TARGET))?;
        self.decode(index)
    }

    /// Open a streaming reader over the LOB column at `index`.
    ///
    /// The reader is valid only while this row is the cursor's current row;
    /// see [`LobReader`] for the invalidation contract.
    pub fn lob(&self, index: usize) -> Result<LobReader> {
        let column = self.column_at(index, "LobReader")?;
        match &self.values[index] {
            TypedValue::Lob(locator) => Ok(LobReader::new(
                self.session.clone(),
                locator.clone(),
                self.lob_chunk_size,
            )),
            _ => Err(Error::conversion(&column.name, "LobReader")),
        }
    }

    /// Buffer the full byte content of the column at `index`.
    ///
    /// Inline values are copied; LOB columns are drained through a reader
    /// internally (and their server handle released).
    pub async fn bytes(&self, index: usize) -> Result<Bytes> {
        let column = self.column_at(index, "bytes")?;
        match &self.values[index] {
            TypedValue::Null => Ok(Bytes::new()),
            TypedValue::Bytes(b) => Ok(b.clone()),
            TypedValue::Text(s) => Ok(Bytes::copy_from_slice(s.as_bytes())),
            TypedValue::Lob(_) => {
                let mut reader = self.lob(index)?;
                let data = reader.read_all().await?;
                reader.close().await?;
                Ok(data)
            }
            _ => Err(Error::conversion(&column.name, "bytes")),
        }
    }

    /// Buffer the full text content of the column at `index`.
    pub async fn text(&self, index: usize) -> Result<String> {
        let column = self.column_at(index, "String")?;
        match &self.values[index] {
            TypedValue::Null => Ok(String::new()),
            TypedValue::Text(s) => Ok(s.clone()),
            TypedValue::Lob(_) => {
                let data = self.bytes(index).await?;
                String::from_utf8(data.to_vec())
                    .map_err(|_| Error::conversion(&column.name, "String"))
            }
            _ => Err(Error::conversion(&column.name, "String")),
        }
    }

    /// Iterate over values.
    pub fn iter(&self) -> impl Iterator<Item = &TypedValue> {
        self.values.iter()
    }
}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row").field("values", &self.values).finish()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a TypedValue;
    type IntoIter = std::slice::Iter<'a, TypedValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

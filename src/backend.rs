//! Vendor backend interface consumed by the adapter.
//!
//! The vendor client library's network/session layer is an external
//! collaborator. The adapter drives it through the [`Backend`] trait, which
//! exposes the vendor primitives (parse, execute, fetch, read-lob, close)
//! over vendor-native value representations. Implementations own the wire
//! protocol; the adapter owns type marshaling and handle lifecycle.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Server-side parse context handle assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementHandle(pub u32);

/// Server-side cursor handle assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CursorHandle(pub u32);

/// LOB locator handle returned by the server.
///
/// The locator is an opaque byte sequence identifying out-of-line data on
/// the server. It references server state and does not own the data; reads
/// go through [`Backend::read_lob`].
#[derive(Debug, Clone, PartialEq)]
pub struct LobLocator {
    /// Raw locator bytes from the server.
    pub locator: Vec<u8>,
    /// Total size of the LOB in bytes.
    pub size: u64,
    /// Recommended chunk size for read operations.
    pub chunk_size: u32,
}

impl LobLocator {
    /// Create a new LOB locator.
    pub fn new(locator: Vec<u8>, size: u64, chunk_size: u32) -> Self {
        Self {
            locator,
            size,
            chunk_size,
        }
    }
}

/// A single column value in the vendor's wire representation.
///
/// Inline payloads carry the vendor encoding for the column's declared type
/// (base-100 NUMBER bytes, 7-byte DATE, UTF-8 text, raw bytes). Large
/// objects arrive as locators and are read separately.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// SQL NULL.
    Null,
    /// Inline payload in the vendor encoding for the declared column type.
    Bytes(Bytes),
    /// Out-of-line LOB locator.
    Lob(LobLocator),
}

impl NativeValue {
    /// Check if the value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }
}

/// Column descriptor as reported by the backend at execute time.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDesc {
    /// Column name.
    pub name: String,
    /// Raw vendor type number.
    pub type_num: u8,
    /// Numeric precision (NUMBER columns).
    pub precision: i8,
    /// Numeric scale (NUMBER columns).
    pub scale: i8,
    /// Maximum size in bytes (sized text types).
    pub max_size: u32,
    /// Whether NULL values are allowed.
    pub nullable: bool,
}

/// Result of executing a statement.
#[derive(Debug)]
pub struct ExecOutcome {
    /// Cursor associated with this statement's result set.
    ///
    /// Re-executing the same [`StatementHandle`] must yield the same cursor
    /// handle; the adapter relies on this to keep the open-cursor count at
    /// O(1) across repeated executions.
    pub cursor: CursorHandle,
    /// Column descriptors, in declared order. Empty for non-query statements.
    pub columns: Vec<ColumnDesc>,
    /// Rows prefetched with the execute round trip.
    pub rows: Vec<Vec<NativeValue>>,
    /// Rows affected (DML statements).
    pub rows_affected: u64,
    /// Whether more rows remain on the server.
    pub more_rows: bool,
}

/// Result of a fetch round trip.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Rows returned, in server order.
    pub rows: Vec<Vec<NativeValue>>,
    /// Whether more rows remain on the server.
    pub more_rows: bool,
}

/// The vendor session primitives the adapter drives.
///
/// One `Backend` instance is one server session. Implementations are driven
/// from a single task at a time; the adapter serializes access behind a
/// mutex and never issues concurrent calls on one session.
#[async_trait]
pub trait Backend: Send {
    /// Parse SQL text, allocating a server-side parse context.
    async fn parse(&mut self, sql: &str) -> Result<StatementHandle>;

    /// Bind parameters and execute a parsed statement.
    ///
    /// `params` are in slot order, already converted to vendor encoding.
    async fn execute(
        &mut self,
        stmt: StatementHandle,
        params: &[NativeValue],
        fetch_size: u32,
    ) -> Result<ExecOutcome>;

    /// Fetch up to `fetch_size` more rows from an open cursor.
    async fn fetch(&mut self, cursor: CursorHandle, fetch_size: u32) -> Result<FetchOutcome>;

    /// Read up to `len` bytes of LOB data starting at `offset` (0-based).
    ///
    /// Returns an empty buffer at end of data.
    async fn read_lob(&mut self, locator: &LobLocator, offset: u64, len: u32) -> Result<Bytes>;

    /// Release a server-side cursor.
    async fn close_cursor(&mut self, cursor: CursorHandle) -> Result<()>;

    /// Release a server-side parse context and any cursor still tied to it.
    async fn close_statement(&mut self, stmt: StatementHandle) -> Result<()>;

    /// Release server-side state backing a LOB locator.
    async fn close_lob(&mut self, locator: &LobLocator) -> Result<()>;

    /// Terminate the session. Any in-flight operation fails afterwards.
    async fn close_session(&mut self) -> Result<()>;
}

/// Factory establishing a [`Backend`] session from a DSN.
///
/// DSN syntax is owned by the vendor library; the adapter passes the string
/// through opaquely.
#[async_trait]
pub trait Connect {
    /// Connect to the backend identified by `dsn`.
    async fn connect(&self, dsn: &str) -> Result<Box<dyn Backend>>;
}

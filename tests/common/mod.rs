//! Scripted in-memory backend for integration tests.
//!
//! Plays the vendor library's role: fixtures keyed by SQL text produce
//! result sets (optionally as a function of the bound parameters), and
//! server-side counters track parse contexts and cursor allocations so
//! tests can assert the adapter's leak bounds.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;
use oracle_adapter_rs::codec::{date, number};
use oracle_adapter_rs::types::oracle_type::{
    TYPE_NUM_BLOB, TYPE_NUM_CLOB, TYPE_NUM_DATE, TYPE_NUM_NUMBER, TYPE_NUM_RAW, TYPE_NUM_VARCHAR,
};
use oracle_adapter_rs::{
    Backend, ColumnDesc, Connect, CursorHandle, Error, ExecOutcome, FetchOutcome, LobLocator,
    NativeValue, Result, StatementHandle,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Server-side resource counters, shared with the test body.
#[derive(Debug, Default)]
pub struct ServerCounters {
    open_cursors: AtomicUsize,
    max_open_cursors: AtomicUsize,
    cursors_allocated: AtomicUsize,
    executes: AtomicUsize,
}

impl ServerCounters {
    /// Parse contexts (with their cursors) currently open.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// High-water mark of open cursors.
    pub fn max_open_cursors(&self) -> usize {
        self.max_open_cursors.load(Ordering::SeqCst)
    }

    /// Total cursor allocations since the session started.
    pub fn cursors_allocated(&self) -> usize {
        self.cursors_allocated.load(Ordering::SeqCst)
    }

    /// Total execute calls that reached the server.
    pub fn executes(&self) -> usize {
        self.executes.load(Ordering::SeqCst)
    }

    fn cursor_opened(&self) {
        let now = self.open_cursors.fetch_add(1, Ordering::SeqCst) + 1;
        self.cursors_allocated.fetch_add(1, Ordering::SeqCst);
        self.max_open_cursors.fetch_max(now, Ordering::SeqCst);
    }

    fn cursor_closed(&self) {
        self.open_cursors.fetch_sub(1, Ordering::SeqCst);
    }
}

type RowsFn = Box<dyn Fn(&[NativeValue]) -> Result<Vec<Vec<NativeValue>>> + Send + Sync>;

struct Fixture {
    columns: Vec<ColumnDesc>,
    rows: RowsFn,
    rows_affected: u64,
}

struct StatementState {
    sql: String,
}

/// Scripted backend session.
pub struct ScriptedBackend {
    fixtures: HashMap<String, Fixture>,
    lobs: HashMap<Vec<u8>, Vec<u8>>,
    statements: HashMap<u32, StatementState>,
    pending: HashMap<u32, Vec<Vec<NativeValue>>>,
    next_id: u32,
    counters: Arc<ServerCounters>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            fixtures: HashMap::new(),
            lobs: HashMap::new(),
            statements: HashMap::new(),
            pending: HashMap::new(),
            next_id: 1,
            counters: Arc::new(ServerCounters::default()),
        }
    }

    pub fn counters(&self) -> Arc<ServerCounters> {
        Arc::clone(&self.counters)
    }

    /// Register a query fixture with a fixed result set.
    pub fn with_query(
        self,
        sql: &str,
        columns: Vec<ColumnDesc>,
        rows: Vec<Vec<NativeValue>>,
    ) -> Self {
        self.with_query_fn(sql, columns, move |_| Ok(rows.clone()))
    }

    /// Register a query fixture whose rows depend on the bound parameters.
    pub fn with_query_fn<F>(mut self, sql: &str, columns: Vec<ColumnDesc>, rows: F) -> Self
    where
        F: Fn(&[NativeValue]) -> Result<Vec<Vec<NativeValue>>> + Send + Sync + 'static,
    {
        self.fixtures.insert(
            sql.to_string(),
            Fixture {
                columns,
                rows: Box::new(rows),
                rows_affected: 0,
            },
        );
        self
    }

    /// Register a non-query fixture reporting `rows_affected`.
    pub fn with_exec(mut self, sql: &str, rows_affected: u64) -> Self {
        self.fixtures.insert(
            sql.to_string(),
            Fixture {
                columns: Vec::new(),
                rows: Box::new(|_| Ok(Vec::new())),
                rows_affected,
            },
        );
        self
    }

    /// Register LOB content addressable by locator bytes.
    pub fn with_lob(mut self, locator_bytes: Vec<u8>, content: Vec<u8>) -> Self {
        self.lobs.insert(locator_bytes, content);
        self
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn parse(&mut self, sql: &str) -> Result<StatementHandle> {
        if !self.fixtures.contains_key(sql) {
            return Err(Error::prepare(format!("ORA-00900: invalid SQL: {sql}")));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.statements.insert(
            id,
            StatementState {
                sql: sql.to_string(),
            },
        );
        self.counters.cursor_opened();
        Ok(StatementHandle(id))
    }

    async fn execute(
        &mut self,
        stmt: StatementHandle,
        params: &[NativeValue],
        fetch_size: u32,
    ) -> Result<ExecOutcome> {
        self.counters.executes.fetch_add(1, Ordering::SeqCst);
        let sql = self
            .statements
            .get(&stmt.0)
            .ok_or_else(|| Error::closed("statement"))?
            .sql
            .clone();
        let fixture = self
            .fixtures
            .get(&sql)
            .ok_or_else(|| Error::execution(format!("no fixture for {sql}")))?;

        let mut rows = (fixture.rows)(params)?;
        let rest = rows.split_off(rows.len().min(fetch_size as usize));
        let more_rows = !rest.is_empty();
        // The cursor shares the parse context's id; re-execution reuses it
        // and does not count as a new allocation.
        self.pending.insert(stmt.0, rest);
        Ok(ExecOutcome {
            cursor: CursorHandle(stmt.0),
            columns: fixture.columns.clone(),
            rows,
            rows_affected: fixture.rows_affected,
            more_rows,
        })
    }

    async fn fetch(&mut self, cursor: CursorHandle, fetch_size: u32) -> Result<FetchOutcome> {
        let pending = self
            .pending
            .get_mut(&cursor.0)
            .ok_or_else(|| Error::closed("cursor"))?;
        let rest = pending.split_off(pending.len().min(fetch_size as usize));
        let rows = std::mem::replace(pending, rest);
        let more_rows = !self.pending[&cursor.0].is_empty();
        Ok(FetchOutcome { rows, more_rows })
    }

    async fn read_lob(&mut self, locator: &LobLocator, offset: u64, len: u32) -> Result<Bytes> {
        let content = self
            .lobs
            .get(&locator.locator)
            .ok_or_else(|| Error::closed("LOB handle"))?;
        let start = (offset as usize).min(content.len());
        let end = (start + len as usize).min(content.len());
        Ok(Bytes::copy_from_slice(&content[start..end]))
    }

    async fn close_cursor(&mut self, cursor: CursorHandle) -> Result<()> {
        // Cancels the result set; the parse context stays open.
        self.pending.remove(&cursor.0);
        Ok(())
    }

    async fn close_statement(&mut self, stmt: StatementHandle) -> Result<()> {
        if self.statements.remove(&stmt.0).is_some() {
            self.pending.remove(&stmt.0);
            self.counters.cursor_closed();
        }
        Ok(())
    }

    async fn close_lob(&mut self, locator: &LobLocator) -> Result<()> {
        self.lobs.remove(&locator.locator);
        Ok(())
    }

    async fn close_session(&mut self) -> Result<()> {
        self.statements.clear();
        self.pending.clear();
        Ok(())
    }
}

/// Connector handing out one pre-scripted session.
pub struct ScriptedConnector(std::sync::Mutex<Option<ScriptedBackend>>);

impl ScriptedConnector {
    pub fn new(backend: ScriptedBackend) -> Self {
        Self(std::sync::Mutex::new(Some(backend)))
    }
}

#[async_trait]
impl Connect for ScriptedConnector {
    async fn connect(&self, dsn: &str) -> Result<Box<dyn Backend>> {
        if dsn.is_empty() {
            return Err(Error::connection("empty DSN"));
        }
        let backend = self
            .0
            .lock()
            .expect("connector poisoned")
            .take()
            .ok_or_else(|| Error::connection("backend unreachable"))?;
        Ok(Box::new(backend))
    }
}

// --- column descriptor helpers ---

fn col(name: &str, type_num: u8) -> ColumnDesc {
    ColumnDesc {
        name: name.to_string(),
        type_num,
        precision: 0,
        scale: 0,
        max_size: 4000,
        nullable: true,
    }
}

pub fn num_col(name: &str) -> ColumnDesc {
    col(name, TYPE_NUM_NUMBER)
}

pub fn str_col(name: &str) -> ColumnDesc {
    col(name, TYPE_NUM_VARCHAR)
}

pub fn date_col(name: &str) -> ColumnDesc {
    col(name, TYPE_NUM_DATE)
}

pub fn raw_col(name: &str) -> ColumnDesc {
    col(name, TYPE_NUM_RAW)
}

pub fn clob_col(name: &str) -> ColumnDesc {
    col(name, TYPE_NUM_CLOB)
}

#[allow(dead_code)]
pub fn blob_col(name: &str) -> ColumnDesc {
    col(name, TYPE_NUM_BLOB)
}

// --- native value helpers ---

pub fn num(value: i64) -> NativeValue {
    NativeValue::Bytes(Bytes::from(number::encode_i64(value)))
}

pub fn num_str(literal: &str) -> NativeValue {
    NativeValue::Bytes(Bytes::from(
        number::encode_number(literal).expect("valid NUMBER literal"),
    ))
}

pub fn text(value: &str) -> NativeValue {
    NativeValue::Bytes(Bytes::copy_from_slice(value.as_bytes()))
}

pub fn raw(value: &[u8]) -> NativeValue {
    NativeValue::Bytes(Bytes::copy_from_slice(value))
}

pub fn timestamp(ts: NaiveDateTime) -> NativeValue {
    NativeValue::Bytes(Bytes::from(
        date::encode_date(&ts).expect("valid DATE value").to_vec(),
    ))
}

/// An all-zero DATE payload, the backend's empty-date literal.
pub fn empty_date() -> NativeValue {
    NativeValue::Bytes(Bytes::from(vec![0u8; 7]))
}

pub fn lob(locator_bytes: Vec<u8>, size: u64, chunk_size: u32) -> NativeValue {
    NativeValue::Lob(LobLocator::new(locator_bytes, size, chunk_size))
}

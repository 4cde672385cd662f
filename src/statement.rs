//! Prepared statements and their server-side cursor lifecycle.
//!
//! A [`Statement`] owns exactly one server parse context, allocated at
//! prepare and released at close. Executions rebind parameters against the
//! same context; the server keeps one cursor associated with it, so N
//! executions of one statement hold O(1) open cursors, not O(N). Bind
//! arity is validated before anything is sent to the backend.

use crate::backend::{CursorHandle, StatementHandle};
use crate::codec::{encode_param, ParamValue};
use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::rows::Rows;
use crate::session::{Deferred, SessionHandle};
use crate::types::ColumnInfo;
use std::sync::Arc;

/// Bind-parameter slots found in the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindSlots {
    /// No bind markers.
    None,
    /// Positional markers (`?` or `:1`-style ordinals); count of slots.
    Positional(usize),
    /// Named markers, distinct names in first-appearance order.
    Named(Vec<String>),
}

impl BindSlots {
    fn count(&self) -> usize {
        match self {
            BindSlots::None => 0,
            BindSlots::Positional(n) => *n,
            BindSlots::Named(names) => names.len(),
        }
    }
}

#[derive(Clone, Copy)]
enum ScanState {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

/// Scan SQL text for bind markers, skipping string literals and comments.
///
/// Recognizes `?` and `:N` ordinals (both positional, bound in call order)
/// and `:name` markers. Mixing named and positional markers in one
/// statement is rejected.
pub(crate) fn scan_bind_slots(sql: &str) -> Result<BindSlots> {
    let bytes = sql.as_bytes();
    let mut state = ScanState::Normal;
    let mut positional = 0usize;
    let mut names: Vec<String> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match state {
            ScanState::Normal => match b {
                b'\'' => state = ScanState::SingleQuoted,
                b'"' => state = ScanState::DoubleQuoted,
                b'-' if bytes.get(i + 1) == Some(&b'-') => {
                    state = ScanState::LineComment;
                    i += 1;
                }
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    state = ScanState::BlockComment;
                    i += 1;
                }
                b'?' => positional += 1,
                b':' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < bytes.len()
                        && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_')
                    {
                        end += 1;
                    }
                    if end > start {
                        let marker = &sql[start..end];
                        if marker.bytes().all(|b| b.is_ascii_digit()) {
                            // Ordinal marker; slot count is the highest
                            // ordinal referenced.
                            let ordinal: usize = marker.parse().map_err(|_| {
                                Error::prepare(format!("bind ordinal :{marker} out of range"))
                            })?;
                            if ordinal == 0 {
                                return Err(Error::prepare("bind ordinal :0 is not valid"));
                            }
                            positional = positional.max(ordinal);
                        } else {
                            let upper = marker.to_uppercase();
                            if !names.contains(&upper) {
                                names.push(upper);
                            }
                        }
                        i = end;
                        continue;
                    }
                }
                _ => {}
            },
            ScanState::SingleQuoted => {
                if b == b'\'' {
                    // '' escapes a quote inside the literal.
                    if bytes.get(i + 1) == Some(&b'\'') {
                        i += 1;
                    } else {
                        state = ScanState::Normal;
                    }
                }
            }
            ScanState::DoubleQuoted => {
                if b == b'"' {
                    state = ScanState::Normal;
                }
            }
            ScanState::LineComment => {
                if b == b'\n' {
                    state = ScanState::Normal;
                }
            }
            ScanState::BlockComment => {
                if b == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    state = ScanState::Normal;
                    i += 1;
                }
            }
        }
        i += 1;
    }

    match (positional, names.is_empty()) {
        (0, true) => Ok(BindSlots::None),
        (n, true) => Ok(BindSlots::Positional(n)),
        (0, false) => Ok(BindSlots::Named(names)),
        (_, false) => Err(Error::prepare(
            "cannot mix named and positional bind markers in one statement",
        )),
    }
}

/// A prepared statement.
///
/// Not internally synchronized: using one `Statement` from multiple tasks
/// without external serialization is not supported. Statements on distinct
/// connections are fully independent.
#[derive(Debug)]
pub struct Statement {
    session: SessionHandle,
    handle: StatementHandle,
    sql: String,
    slots: BindSlots,
    cursor: Option<CursorHandle>,
    fetch_size: u32,
    lob_chunk_size: u32,
    closed: bool,
}

impl Statement {
    /// Parse `sql`, allocating one server-side parse context.
    pub(crate) async fn prepare(
        session: SessionHandle,
        sql: &str,
        config: &AdapterConfig,
    ) -> Result<Self> {
        let slots = scan_bind_slots(sql)?;
        let handle = session.backend("connection").await?.parse(sql).await?;
        session.stats().statement_opened();
        tracing::debug!(sql, handle = handle.0, "prepared statement");
        Ok(Self {
            session,
            handle,
            sql: sql.to_string(),
            slots,
            cursor: None,
            fetch_size: config.fetch_size,
            lob_chunk_size: config.lob_chunk_size,
            closed: false,
        })
    }

    /// The SQL text this statement was prepared from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of bind-parameter slots.
    pub fn param_count(&self) -> usize {
        self.slots.count()
    }

    /// Check if the statement has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::closed("statement"))
        } else {
            Ok(())
        }
    }

    fn bind_positional(&self, args: &[ParamValue]) -> Result<Vec<crate::backend::NativeValue>> {
        let expected = match &self.slots {
            BindSlots::None => 0,
            BindSlots::Positional(n) => *n,
            BindSlots::Named(_) => {
                return Err(Error::bind(
                    "statement uses named bind markers; bind by name",
                ))
            }
        };
        if args.len() != expected {
            return Err(Error::bind(format!(
                "statement has {expected} bind slot(s), got {} argument(s)",
                args.len()
            )));
        }
        args.iter().map(encode_param).collect()
    }

    fn bind_named(&self, args: &[(&str, ParamValue)]) -> Result<Vec<crate::backend::NativeValue>> {
        let names = match &self.slots {
            BindSlots::Named(names) => names,
            BindSlots::None if args.is_empty() => return Ok(Vec::new()),
            BindSlots::None => {
                return Err(Error::bind("statement has no bind slots"));
            }
            BindSlots::Positional(_) => {
                return Err(Error::bind(
                    "statement uses positional bind markers; bind by position",
                ))
            }
        };
        if args.len() != names.len() {
            return Err(Error::bind(format!(
                "statement has {} named bind slot(s), got {} argument(s)",
                names.len(),
                args.len()
            )));
        }
        names
            .iter()
            .map(|slot| {
                let (_, value) = args
                    .iter()
                    .find(|(name, _)| name.to_uppercase() == *slot)
                    .ok_or_else(|| Error::bind(format!("no argument for bind name :{slot}")))?;
                encode_param(value)
            })
            .collect()
    }

    async fn run(
        &mut self,
        params: Vec<crate::backend::NativeValue>,
    ) -> Result<crate::backend::ExecOutcome> {
        let outcome = self
            .session
            .backend("statement")
            .await?
            .execute(self.handle, &params, self.fetch_size)
            .await?;
        // The server keeps one cursor per parse context; re-execution must
        // come back with the same association.
        match self.cursor {
            None => self.cursor = Some(outcome.cursor),
            Some(existing) if existing == outcome.cursor => {}
            Some(existing) => {
                tracing::debug!(
                    old = existing.0,
                    new = outcome.cursor.0,
                    "backend re-associated cursor"
                );
                self.cursor = Some(outcome.cursor);
            }
        }
        Ok(outcome)
    }

    /// Execute as a query, binding `args` positionally.
    pub async fn query(&mut self, args: &[ParamValue]) -> Result<Rows> {
        self.check_open()?;
        let params = self.bind_positional(args)?;
        let outcome = self.run(params).await?;
        let columns = Arc::new(ColumnInfo::from_descs(&outcome.columns)?);
        self.session.stats().cursor_opened();
        Ok(Rows::new(
            self.session.clone(),
            outcome.cursor,
            columns,
            outcome.rows,
            outcome.more_rows,
            self.fetch_size,
            self.lob_chunk_size,
        ))
    }

    /// Execute as a query, binding `args` by name.
    pub async fn query_named(&mut self, args: &[(&str, ParamValue)]) -> Result<Rows> {
        self.check_open()?;
        let params = self.bind_named(args)?;
        let outcome = self.run(params).await?;
        let columns = Arc::new(ColumnInfo::from_descs(&outcome.columns)?);
        self.session.stats().cursor_opened();
        Ok(Rows::new(
            self.session.clone(),
            outcome.cursor,
            columns,
            outcome.rows,
            outcome.more_rows,
            self.fetch_size,
            self.lob_chunk_size,
        ))
    }

    /// Execute as a non-query statement, binding `args` positionally.
    ///
    /// Returns the number of rows affected. An execution error leaves the
    /// statement usable for a subsequent execute.
    pub async fn execute(&mut self, args: &[ParamValue]) -> Result<u64> {
        self.check_open()?;
        let params = self.bind_positional(args)?;
        let outcome = self.run(params).await?;
        Ok(outcome.rows_affected)
    }

    /// Execute as a non-query statement, binding `args` by name.
    pub async fn execute_named(&mut self, args: &[(&str, ParamValue)]) -> Result<u64> {
        self.check_open()?;
        let params = self.bind_named(args)?;
        let outcome = self.run(params).await?;
        Ok(outcome.rows_affected)
    }

    /// Release the server-side parse context and its cursor. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.session.stats().statement_closed();
        tracing::debug!(handle = self.handle.0, "closing statement");
        self.session
            .backend("connection")
            .await?
            .close_statement(self.handle)
            .await
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            self.session.stats().statement_closed();
            self.session.defer(Deferred::Statement(self.handle));
        }
    }
}

//! Result cursor iteration with row buffering.

use crate::backend::{CursorHandle, NativeValue};
use crate::codec::decode_column;
use crate::error::{Error, Result};
use crate::session::{Deferred, SessionHandle};
use crate::statement::Statement;
use crate::types::{ColumnInfo, Row};
use futures::Stream;
use std::sync::Arc;

/// Iterator state over one execution's row set.
///
/// Rows are buffered per fetch round trip and handed out one at a time in
/// server order; column values decode left to right in declared order. A
/// decode failure is reported for its row only; rows already returned stay
/// valid, and iteration can continue past the failing row.
///
/// Close on every exit path: either drain to exhaustion or call
/// [`close`](Self::close). Rows dropped early defer the cursor release to
/// the session. Like statements, a `Rows` is not internally synchronized
/// for concurrent use.
#[derive(Debug)]
pub struct Rows {
    session: SessionHandle,
    cursor: CursorHandle,
    columns: Arc<ColumnInfo>,
    buffer: Vec<Vec<NativeValue>>,
    buffer_pos: usize,
    more_rows: bool,
    fetch_size: u32,
    lob_chunk_size: u32,
    rows_fetched: u64,
    /// Exhausted: the server delivered the last row.
    done: bool,
    /// Explicitly closed by the caller (or by `next` on exhaustion).
    closed: bool,
    /// Statement owned by a one-shot `Connection::query`, closed with us.
    owned_statement: Option<Statement>,
}

impl Rows {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        session: SessionHandle,
        cursor: CursorHandle,
        columns: Arc<ColumnInfo>,
        buffer: Vec<Vec<NativeValue>>,
        more_rows: bool,
        fetch_size: u32,
        lob_chunk_size: u32,
    ) -> Self {
        Self {
            session,
            cursor,
            columns,
            buffer,
            buffer_pos: 0,
            more_rows,
            fetch_size,
            lob_chunk_size,
            rows_fetched: 0,
            done: false,
            closed: false,
            owned_statement: None,
        }
    }

    pub(crate) fn with_statement(mut self, statement: Statement) -> Self {
        self.owned_statement = Some(statement);
        self
    }

    /// Column names in declared order.
    pub fn columns(&self) -> Vec<&str> {
        self.columns.column_names()
    }

    /// Column descriptors.
    pub fn column_info(&self) -> &ColumnInfo {
        &self.columns
    }

    /// Number of rows returned so far.
    pub fn rows_fetched(&self) -> u64 {
        self.rows_fetched
    }

    /// Check if the cursor is exhausted or closed.
    pub fn is_closed(&self) -> bool {
        self.closed || self.done
    }

    fn decode_row(&self, native: Vec<NativeValue>) -> Result<Row> {
        if native.len() != self.columns.len() {
            return Err(Error::invalid_payload(
                "row",
                format!(
                    "{} value(s) for {} column(s)",
                    native.len(),
                    self.columns.len()
                ),
            ));
        }
        let mut values = Vec::with_capacity(native.len());
        for (value, column) in native.iter().zip(&self.columns.columns) {
            values.push(decode_column(value, column)?);
        }
        Ok(Row::new(
            values,
            Arc::clone(&self.columns),
            self.session.clone(),
            self.lob_chunk_size,
        ))
    }

    async fn do_fetch(&mut self) -> Result<()> {
        if self.buffer_pos >= self.buffer.len() {
            self.buffer.clear();
            self.buffer_pos = 0;
        }
        let outcome = self
            .session
            .backend("cursor")
            .await?
            .fetch(self.cursor, self.fetch_size)
            .await?;
        tracing::trace!(
            cursor = self.cursor.0,
            rows = outcome.rows.len(),
            more = outcome.more_rows,
            "fetched"
        );
        self.buffer.extend(outcome.rows);
        self.more_rows = outcome.more_rows;
        Ok(())
    }

    /// Get the next row, fetching from the server when the buffer runs out.
    ///
    /// Returns `Ok(None)` once exhausted. Calling `next` after an explicit
    /// [`close`](Self::close) is a `Resource` error.
    pub async fn next(&mut self) -> Result<Option<Row>> {
        if self.closed {
            return Err(Error::closed("cursor"));
        }
        if self.done {
            return Ok(None);
        }

        loop {
            if self.buffer_pos < self.buffer.len() {
                let native = std::mem::take(&mut self.buffer[self.buffer_pos]);
                self.buffer_pos += 1;
                self.rows_fetched += 1;
                // A decode error belongs to this row alone; the cursor
                // stays usable for the rows after it.
                return self.decode_row(native).map(Some);
            }
            if !self.more_rows {
                // Server side ended the result set with the last row; no
                // release round trip needed.
                self.done = true;
                self.session.stats().cursor_closed();
                return Ok(None);
            }
            self.do_fetch().await?;
        }
    }

    /// Fetch all remaining rows.
    pub async fn fetch_all(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Release the server-side cursor. Idempotent.
    ///
    /// Required when abandoning a result set before exhaustion; closing an
    /// exhausted cursor is a no-op. Also closes the statement for one-shot
    /// `Connection::query` results.
    pub async fn close(&mut self) -> Result<()> {
        let release = if self.closed || self.done {
            Ok(())
        } else {
            self.closed = true;
            self.done = true;
            self.session.stats().cursor_closed();
            tracing::debug!(cursor = self.cursor.0, "closing cursor early");
            match self.session.backend("connection").await {
                Ok(mut backend) => backend.close_cursor(self.cursor).await,
                Err(err) => Err(err),
            }
        };
        self.closed = true;
        let statement = match self.owned_statement.take() {
            Some(mut statement) => statement.close().await,
            None => Ok(()),
        };
        release.and(statement)
    }

    /// Convert into a `Stream` of rows.
    pub fn into_stream(self) -> impl Stream<Item = Result<Row>> {
        use futures::stream;

        stream::unfold(Some(self), |rows| async move {
            let mut rows = rows?;
            match rows.next().await {
                Ok(Some(row)) => Some((Ok(row), Some(rows))),
                Ok(None) => None,
                Err(e) => Some((Err(e), Some(rows))),
            }
        })
    }
}

impl Drop for Rows {
    fn drop(&mut self) {
        if !self.closed && !self.done {
            self.closed = true;
            self.session.stats().cursor_closed();
            self.session.defer(Deferred::Cursor(self.cursor));
        }
        // An owned statement runs its own Drop.
    }
}

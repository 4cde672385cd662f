//! High-level Connection API for the Oracle driver adapter.

use crate::backend::{Backend, Connect};
use crate::codec::ParamValue;
use crate::config::AdapterConfig;
use crate::error::{Error, Result};
use crate::rows::Rows;
use crate::session::{SessionHandle, SessionStats};
use crate::statement::Statement;
use crate::types::Row;
use std::sync::Arc;

/// A database connection.
///
/// One connection is one backend session, used by a single logical caller
/// at a time: the adapter does not schedule work itself, and invoking
/// operations on one `Connection` (or any statement/cursor derived from
/// it) from multiple threads without external serialization is not
/// supported. Distinct connections are fully independent.
///
/// All statements and cursors derive from the connection and must not
/// outlive it: [`close`](Self::close) terminates the session, after which
/// every dependent handle reports a `Resource` error — including
/// operations that were about to hit the backend, which is the adapter's
/// cancellation mechanism.
pub struct Connection {
    session: SessionHandle,
    config: AdapterConfig,
}

impl Connection {
    /// Open a connection through a backend connector.
    ///
    /// The DSN is passed to the connector opaquely; its syntax belongs to
    /// the vendor library.
    pub async fn open<C: Connect>(connector: &C, dsn: &str, config: AdapterConfig) -> Result<Self> {
        tracing::debug!(dsn, "opening connection");
        let backend = connector.connect(dsn).await?;
        Ok(Self::from_backend(backend, config))
    }

    /// Wrap an already-established backend session.
    pub fn from_backend(backend: Box<dyn Backend>, config: AdapterConfig) -> Self {
        Self {
            session: SessionHandle::new(backend),
            config,
        }
    }

    /// Prepare a statement.
    ///
    /// The statement owns one server-side parse context until closed.
    pub async fn prepare(&self, sql: &str) -> Result<Statement> {
        Statement::prepare(self.session.clone(), sql, &self.config).await
    }

    /// One-shot query: prepare, execute, and return the rows.
    ///
    /// The internal statement is released when the returned [`Rows`] is
    /// closed or drained.
    pub async fn query(&self, sql: &str, args: &[ParamValue]) -> Result<Rows> {
        let mut statement = self.prepare(sql).await?;
        match statement.query(args).await {
            Ok(rows) => Ok(rows.with_statement(statement)),
            Err(err) => {
                // Release the parse context before surfacing the error.
                let _ = statement.close().await;
                Err(err)
            }
        }
    }

    /// One-shot query binding arguments by name.
    pub async fn query_named(&self, sql: &str, args: &[(&str, ParamValue)]) -> Result<Rows> {
        let mut statement = self.prepare(sql).await?;
        match statement.query_named(args).await {
            Ok(rows) => Ok(rows.with_statement(statement)),
            Err(err) => {
                let _ = statement.close().await;
                Err(err)
            }
        }
    }

    /// Query expecting a single row.
    ///
    /// Fails with [`Error::NoRows`] when the result set is empty. Extra
    /// rows are discarded and the cursor released.
    pub async fn query_row(&self, sql: &str, args: &[ParamValue]) -> Result<Row> {
        let mut rows = self.query(sql, args).await?;
        let row = rows.next().await;
        let closed = rows.close().await;
        let row = row?;
        closed?;
        row.ok_or(Error::NoRows)
    }

    /// One-shot non-query statement; returns rows affected.
    pub async fn execute(&self, sql: &str, args: &[ParamValue]) -> Result<u64> {
        let mut statement = self.prepare(sql).await?;
        let result = statement.execute(args).await;
        let closed = statement.close().await;
        let affected = result?;
        closed?;
        Ok(affected)
    }

    /// The configuration this connection was built with.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Outstanding-handle counters for this connection.
    pub fn stats(&self) -> Arc<SessionStats> {
        Arc::clone(self.session.stats())
    }

    /// Check if the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// Close the connection, terminating the backend session. Idempotent.
    ///
    /// Dependent statements, cursors and LOB readers become unusable and
    /// report `Resource` errors.
    pub async fn close(&self) -> Result<()> {
        self.session.close().await
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("closed", &self.is_closed())
            .field("config", &self.config)
            .finish()
    }
}

//! Shared session state behind every handle the adapter gives out.
//!
//! One [`SessionHandle`] wraps one backend session. Connection, Statement,
//! Rows and LobReader all hold clones of it; access to the backend is
//! serialized through an async mutex, and handles dropped without an
//! explicit `close()` enqueue their server-side release here, to be drained
//! before the next backend operation. That keeps the scoped-release
//! contract (resources freed on every exit path) without async drop.

use crate::backend::{Backend, CursorHandle, LobLocator, StatementHandle};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, MutexGuard};

/// A server-side resource whose release was deferred from a `Drop`.
#[derive(Debug)]
pub(crate) enum Deferred {
    Cursor(CursorHandle),
    Statement(StatementHandle),
    Lob(LobLocator),
}

/// Adapter-side counters of outstanding handles on one connection.
///
/// Useful for leak detection in tests: after closing every statement, row
/// set and LOB reader, all counters return to zero.
#[derive(Debug, Default)]
pub struct SessionStats {
    statements: AtomicUsize,
    cursors: AtomicUsize,
    lobs: AtomicUsize,
}

impl SessionStats {
    /// Prepared statements not yet closed.
    pub fn open_statements(&self) -> usize {
        self.statements.load(Ordering::SeqCst)
    }

    /// Result cursors not yet closed or exhausted.
    pub fn open_cursors(&self) -> usize {
        self.cursors.load(Ordering::SeqCst)
    }

    /// LOB readers not yet closed.
    pub fn open_lobs(&self) -> usize {
        self.lobs.load(Ordering::SeqCst)
    }

    pub(crate) fn statement_opened(&self) {
        self.statements.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn statement_closed(&self) {
        self.statements.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn cursor_opened(&self) {
        self.cursors.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn cursor_closed(&self) {
        self.cursors.fetch_sub(1, Ordering::SeqCst);
    }

    pub(crate) fn lob_opened(&self) {
        self.lobs.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn lob_closed(&self) {
        self.lobs.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Cloneable handle to one backend session.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    backend: Arc<Mutex<Box<dyn Backend>>>,
    closed: Arc<AtomicBool>,
    stats: Arc<SessionStats>,
    deferred: Arc<StdMutex<Vec<Deferred>>>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl SessionHandle {
    pub(crate) fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            closed: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SessionStats::default()),
            deferred: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    pub(crate) fn stats(&self) -> &Arc<SessionStats> {
        &self.stats
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Enqueue a server-side release from a `Drop` implementation.
    ///
    /// The release runs before the next backend operation on this session.
    pub(crate) fn defer(&self, item: Deferred) {
        if self.is_closed() {
            // Session gone; the server released everything with it.
            return;
        }
        tracing::trace!(?item, "deferring server-side release");
        self.deferred
            .lock()
            .expect("deferred queue poisoned")
            .push(item);
    }

    /// Lock the backend for one operation.
    ///
    /// Fails with a `Resource` error naming `handle` when the session is
    /// closed. Drains any deferred releases first so server resources from
    /// dropped handles never outlive the next round trip.
    pub(crate) async fn backend(
        &self,
        handle: &'static str,
    ) -> Result<MutexGuard<'_, Box<dyn Backend>>> {
        if self.is_closed() {
            return Err(Error::closed(handle));
        }
        let mut guard = self.backend.lock().await;
        self.drain_deferred(&mut guard).await;
        Ok(guard)
    }

    async fn drain_deferred(&self, backend: &mut MutexGuard<'_, Box<dyn Backend>>) {
        loop {
            let item = self
                .deferred
                .lock()
                .expect("deferred queue poisoned")
                .pop();
            let Some(item) = item else { break };
            tracing::debug!(?item, "releasing deferred server resource");
            // A failed release is logged, not raised: it must not mask the
            // operation the caller is actually performing.
            let result = match &item {
                Deferred::Cursor(cursor) => backend.close_cursor(*cursor).await,
                Deferred::Statement(stmt) => backend.close_statement(*stmt).await,
                Deferred::Lob(locator) => backend.close_lob(locator).await,
            };
            if let Err(err) = result {
                tracing::debug!(?item, %err, "deferred release failed");
            }
        }
    }

    /// Close the session. Idempotent.
    ///
    /// Drains deferred releases, terminates the backend session and marks
    /// the handle closed; any later operation on a dependent handle reports
    /// a `Resource` error. Closing is also how in-flight work is cancelled.
    pub(crate) async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut guard = self.backend.lock().await;
        // Items queued before close still get released through the live
        // session.
        self.drain_deferred(&mut guard).await;
        tracing::debug!("closing backend session");
        guard.close_session().await
    }
}

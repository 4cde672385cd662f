//! Streaming reads of large objects through their server-side locators.

use crate::backend::LobLocator;
use crate::error::{Error, Result};
use crate::session::{Deferred, SessionHandle};
use bytes::{Bytes, BytesMut};

/// Sequential, forward-only reader over a CLOB/BLOB locator.
///
/// The reader references server-side state, it does not own the data.
/// It is only valid while the row that produced it is current: once the
/// parent cursor advances past that row or closes, the server may have
/// invalidated the locator and further reads are **undefined**. Read (or
/// buffer via [`read_all`](Self::read_all)) before moving on.
///
/// `close()` releases the server-side handle and is idempotent; reads after
/// close fail with a `Resource` error.
pub struct LobReader {
    session: SessionHandle,
    locator: LobLocator,
    pos: u64,
    chunk_size: u32,
    closed: bool,
}

impl LobReader {
    pub(crate) fn new(session: SessionHandle, locator: LobLocator, default_chunk: u32) -> Self {
        let chunk_size = if locator.chunk_size > 0 {
            locator.chunk_size
        } else {
            default_chunk
        };
        session.stats().lob_opened();
        Self {
            session,
            locator,
            pos: 0,
            chunk_size,
            closed: false,
        }
    }

    /// Total size of the LOB in bytes, as reported by the server.
    pub fn size(&self) -> u64 {
        self.locator.size
    }

    /// Bytes read so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Check if the reader has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Read the next chunk into `buf`.
    ///
    /// Returns the number of bytes written; `0` means end of data. Partial
    /// fills are normal, loop until `0` or use [`read_all`](Self::read_all).
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if self.closed {
            return Err(Error::closed("LOB handle"));
        }
        if buf.is_empty() || self.pos >= self.locator.size {
            return Ok(0);
        }

        let want = buf.len().min(self.chunk_size as usize) as u32;
        let data = self
            .session
            .backend("LOB handle")
            .await?
            .read_lob(&self.locator, self.pos, want)
            .await?;
        if data.is_empty() {
            return Ok(0);
        }

        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        self.pos += n as u64;
        Ok(n)
    }

    /// Drain the remaining data into one buffer.
    pub async fn read_all(&mut self) -> Result<Bytes> {
        let remaining = self.locator.size.saturating_sub(self.pos) as usize;
        let mut out = BytesMut::with_capacity(remaining);
        let mut chunk = vec![0u8; self.chunk_size as usize];
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..n]);
        }
        Ok(out.freeze())
    }

    /// Release the server-side handle. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.session.stats().lob_closed();
        self.session
            .backend("connection")
            .await?
            .close_lob(&self.locator)
            .await
    }
}

impl Drop for LobReader {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            self.session.stats().lob_closed();
            self.session.defer(Deferred::Lob(self.locator.clone()));
        }
    }
}

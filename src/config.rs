//! Adapter configuration.

/// Tuning knobs threaded into the adapter at construction.
///
/// Explicit configuration replaces any process-wide mutable state; two
/// connections with different configs do not affect each other. Verbosity
/// is not configured here: the adapter emits `tracing` events and the
/// embedding application decides what to record.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Rows requested per fetch round trip.
    pub fetch_size: u32,
    /// Default chunk size for LOB reads when the locator does not carry a
    /// server recommendation.
    pub lob_chunk_size: u32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            fetch_size: 100,
            lob_chunk_size: 8192,
        }
    }
}

impl AdapterConfig {
    /// Set the fetch size.
    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// Set the LOB chunk size.
    pub fn with_lob_chunk_size(mut self, lob_chunk_size: u32) -> Self {
        self.lob_chunk_size = lob_chunk_size;
        self
    }
}

//! Error types for the Oracle driver adapter.

use std::io;
use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Oracle driver adapter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error reported by the backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to establish or keep a session. Fatal to the connection.
    #[error("Connection error: {message}")]
    Connection { message: String },

    /// The backend rejected the SQL text at parse time.
    #[error("Prepare error: {message}")]
    Prepare { message: String },

    /// Argument count or name set does not match the statement's
    /// parameter slots. Raised before any backend call.
    #[error("Bind error: {message}")]
    Bind { message: String },

    /// The backend rejected an execution of a prepared statement.
    /// The statement remains usable for a subsequent execute.
    #[error("Execution error: {message}")]
    Execution { message: String },

    /// A column value could not be decoded into the requested target type.
    /// Other columns in the same row remain valid.
    #[error("Cannot convert column {column} to {target}")]
    Conversion { column: String, target: &'static str },

    /// Operation on a closed connection, statement, cursor or LOB handle.
    #[error("{handle} is closed")]
    Resource { handle: &'static str },

    /// Oracle database error.
    #[error("ORA-{code:05}: {message}")]
    Oracle { code: u32, message: String },

    /// Malformed vendor-native value payload.
    #[error("Invalid {kind} payload: {message}")]
    InvalidPayload { kind: &'static str, message: String },

    /// Query expected to produce a row produced none.
    #[error("No rows returned")]
    NoRows,
}

impl Error {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a prepare error.
    pub fn prepare(message: impl Into<String>) -> Self {
        Self::Prepare {
            message: message.into(),
        }
    }

    /// Create a bind error.
    pub fn bind(message: impl Into<String>) -> Self {
        Self::Bind {
            message: message.into(),
        }
    }

    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Create a conversion error for a column/target pairing.
    pub fn conversion(column: impl Into<String>, target: &'static str) -> Self {
        Self::Conversion {
            column: column.into(),
            target,
        }
    }

    /// Create a closed-handle error.
    pub fn closed(handle: &'static str) -> Self {
        Self::Resource { handle }
    }

    /// Create an Oracle database error.
    pub fn oracle(code: u32, message: impl Into<String>) -> Self {
        Self::Oracle {
            code,
            message: message.into(),
        }
    }

    /// Create an invalid-payload error.
    pub fn invalid_payload(kind: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            kind,
            message: message.into(),
        }
    }
}

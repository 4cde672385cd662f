//! Oracle driver adapter for Rust.
//!
//! Bridges a generic database client surface (connections, prepared
//! statements, row cursors, typed scanning) onto a vendor Oracle client
//! library, supplied as a [`Backend`] implementation. The adapter owns
//! type marshaling between generic Rust values and vendor-native
//! encodings (NUMBER, DATE, text, RAW, LOB locators) and the
//! statement/cursor lifecycle, guaranteeing that repeated
//! prepare/execute/close cycles do not accumulate server-side cursors.
//!
//! # Example
//!
//! ```no_run
//! use oracle_adapter_rs::{AdapterConfig, Connection, Result};
//! # use oracle_adapter_rs::Connect;
//!
//! # async fn demo(connector: &impl Connect) -> Result<()> {
//! let conn = Connection::open(connector, "db-host:1521/APP", AdapterConfig::default()).await?;
//!
//! let mut stmt = conn.prepare("SELECT id, name FROM users WHERE id = :1").await?;
//! let mut rows = stmt.query(&[42.into()]).await?;
//! while let Some(row) = rows.next().await? {
//!     let id: i64 = row.decode(0)?;
//!     let name: String = row.decode(1)?;
//!     println!("{id}: {name}");
//! }
//! rows.close().await?;
//! stmt.close().await?;
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod lob;
pub mod rows;
mod session;
pub mod statement;
pub mod types;

// Re-export main types
pub use backend::{
    Backend, ColumnDesc, Connect, CursorHandle, ExecOutcome, FetchOutcome, LobLocator,
    NativeValue, StatementHandle,
};
pub use codec::{FromValue, ParamValue};
pub use config::AdapterConfig;
pub use connection::Connection;
pub use error::{Error, Result};
pub use lob::LobReader;
pub use rows::Rows;
pub use session::SessionStats;
pub use statement::Statement;
pub use types::{Column, ColumnInfo, OracleType, Row, TypedValue};

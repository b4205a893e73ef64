//! Core database infrastructure
//!
//! This module provides the foundational database components:
//! - `DatabaseConn`: SQLite connection manager (connect, close, last error)
//! - statement execution (`fetch_one`, `fetch_all`, `commit`, `custom`)
//! - `DbResponse`: the uniform result envelope
//! - `DbError`: typed failures
//! - `StatementRegistry`: named statement templates

mod connection;
mod error;
mod executor;
mod response;
mod statements;

pub use connection::{ConnectParams, DatabaseConn, DATABASE_URL_ENV, DEFAULT_BUSY_TIMEOUT};
pub use error::{DbError, ErrorKind, StatementError};
pub use executor::Bindings;
pub use response::{format_rows, format_tuple, format_value, DbResponse, Row};
pub use statements::{interpolate, StatementKind, StatementRegistry, StatementTemplate};

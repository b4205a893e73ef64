//! Database error types
//!
//! Every failure the data layer can produce is one of the [`DbError`] variants.
//! Errors are plain data (`Clone + PartialEq`) so they can be kept as the
//! connection's "last error" and compared in tests.

use rusqlite::ErrorCode as SqliteCode;

/// Coarse classification of a [`DbError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unusable connection string
    Config,
    /// The store could not be opened
    Connection,
    /// A statement failed inside the driver
    Statement,
    /// Rejected before any I/O
    Unsupported,
    /// No registered statement under the requested name
    UnknownStatement,
    /// No open connection
    NotConnected,
}

/// Details captured from a failed statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementError {
    /// The statement text as submitted
    pub sql: String,
    /// Rendered bind parameters, e.g. `('42', 'Alice')`
    pub params: String,
    /// Full driver error text
    pub driver_message: String,
    /// SQLite extended result code, `None` for errors raised by rusqlite itself
    pub code: Option<i32>,
    /// Severity derived from the result code
    pub severity: String,
    /// Primary message reported by the engine
    pub primary_message: String,
}

impl StatementError {
    /// Capture a rusqlite error raised while running `sql` with `params`
    pub fn from_rusqlite(err: &rusqlite::Error, sql: &str, params: String) -> Self {
        let (code, severity, primary_message) = match err {
            rusqlite::Error::SqliteFailure(ffi_err, msg) => (
                Some(ffi_err.extended_code),
                severity_for(ffi_err.code).to_string(),
                msg.clone().unwrap_or_else(|| ffi_err.to_string()),
            ),
            other => (None, "ERROR".to_string(), other.to_string()),
        };

        StatementError {
            sql: sql.to_string(),
            params,
            driver_message: err.to_string(),
            code,
            severity,
            primary_message,
        }
    }

    /// Render the two diagnostic lines that follow a header
    pub fn diagnostic(&self) -> String {
        let code = self
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "Error: {} (Code: {})\nMessage: {} (Severity: {})",
            self.driver_message, code, self.primary_message, self.severity
        )
    }
}

/// Map an SQLite primary result code onto a severity label
fn severity_for(code: SqliteCode) -> &'static str {
    match code {
        SqliteCode::DatabaseCorrupt
        | SqliteCode::NotADatabase
        | SqliteCode::CannotOpen
        | SqliteCode::SystemIoFailure
        | SqliteCode::OutOfMemory
        | SqliteCode::DiskFull => "FATAL",
        SqliteCode::DatabaseBusy | SqliteCode::DatabaseLocked => "WARNING",
        _ => "ERROR",
    }
}

/// Errors produced by the connection manager, executor and repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbError {
    /// Missing or malformed connection configuration
    Config(String),
    /// The driver could not open or configure the store
    Connection { target: String, message: String },
    /// A statement failed
    Statement(StatementError),
    /// Operation rejected before contacting the store
    Unsupported(String),
    /// Named statement missing from the registry
    UnknownStatement(String),
    /// No live connection
    NotConnected,
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Config(_) => ErrorKind::Config,
            DbError::Connection { .. } => ErrorKind::Connection,
            DbError::Statement(_) => ErrorKind::Statement,
            DbError::Unsupported(_) => ErrorKind::Unsupported,
            DbError::UnknownStatement(_) => ErrorKind::UnknownStatement,
            DbError::NotConnected => ErrorKind::NotConnected,
        }
    }

    /// Statement details, if this is a statement error
    pub fn as_statement(&self) -> Option<&StatementError> {
        match self {
            DbError::Statement(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DbError::Connection { target, message } => {
                write!(f, "Failed to connect to {}: {}", target, message)
            }
            DbError::Statement(e) => write!(f, "Failed to execute \"{}\": {}", e.sql, e.driver_message),
            DbError::Unsupported(msg) => write!(f, "Unsupported operation: {}", msg),
            DbError::UnknownStatement(name) => write!(f, "Statement \"{}\" not found", name),
            DbError::NotConnected => write!(f, "Not connected to database"),
        }
    }
}

impl std::error::Error for DbError {}

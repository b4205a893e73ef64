//! Database connection management
//!
//! This module provides the connection manager used by the player database.
//! It holds at most one SQLite connection, remembers the last error seen on it,
//! and never panics or propagates driver errors past its own boundary.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::{info, warn};

use super::error::{DbError, StatementError};

/// Environment variable holding the connection string
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Default busy timeout applied to every connection
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MEMORY_DATABASE: &str = ":memory:";

/// Explicit connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    /// Path to the database file, or `:memory:`
    pub database: String,
    /// Open without write access
    pub read_only: bool,
    /// How long to wait on a locked database before failing
    pub busy_timeout: Duration,
}

impl ConnectParams {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            read_only: false,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Parameters for a private in-memory database
    pub fn in_memory() -> Self {
        Self::new(MEMORY_DATABASE)
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Parse a connection URL
    ///
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, `file:<path>`, a bare path,
    /// and `:memory:` (optionally behind a `sqlite:` prefix).
    pub fn from_url(url: &str) -> Result<Self, DbError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DbError::Config(format!("{} is empty", DATABASE_URL_ENV)));
        }

        let database = if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite:") {
            rest
        } else if let Some(rest) = url.strip_prefix("file:") {
            rest
        } else if let Some((scheme, _)) = url.split_once("://") {
            return Err(DbError::Config(format!(
                "unsupported scheme '{}' in {}",
                scheme, DATABASE_URL_ENV
            )));
        } else {
            url
        };

        // query strings such as `?mode=rwc` are not interpreted
        let database = database.split('?').next().unwrap_or_default();
        if database.is_empty() {
            return Err(DbError::Config(format!(
                "no database path in {}",
                DATABASE_URL_ENV
            )));
        }

        Ok(Self::new(database))
    }

    /// Whether these parameters describe an in-memory database
    pub fn is_memory(&self) -> bool {
        self.database == MEMORY_DATABASE
    }

    /// Connection parameters rendered as a single line
    pub fn dsn(&self) -> String {
        format!(
            "database={} mode={} busy_timeout={}ms",
            self.database,
            if self.read_only { "ro" } else { "rw" },
            self.busy_timeout.as_millis()
        )
    }
}

/// Core database connection wrapper
///
/// `DatabaseConn` owns zero or one live SQLite connection. Connecting and
/// closing report failures as values; statement execution lives in the
/// executor module.
#[derive(Default)]
pub struct DatabaseConn {
    pub(super) conn: Option<Connection>,
    params: Option<ConnectParams>,
    pub(super) last_error: Option<DbError>,
}

impl DatabaseConn {
    /// A manager with no connection yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect and return the manager, or the failure
    pub fn open(params: Option<&ConnectParams>) -> Result<Self, DbError> {
        let mut db = Self::new();
        db.connect(params)?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self, DbError> {
        Self::open(Some(&ConnectParams::in_memory()))
    }

    /// Open a connection
    ///
    /// Without `params` the connection string is read from `DATABASE_URL`.
    /// An existing connection is closed first. Failures are logged, kept as
    /// the last error, and returned.
    pub fn connect(&mut self, params: Option<&ConnectParams>) -> Result<(), DbError> {
        if self.conn.is_some() {
            self.close();
        }

        let params = match params {
            Some(p) => p.clone(),
            None => match Self::params_from_env() {
                Ok(p) => p,
                Err(e) => return Err(self.record(e)),
            },
        };

        match Self::open_connection(&params) {
            Ok(conn) => {
                info!("Connected to database ({})", params.dsn());
                self.conn = Some(conn);
                self.params = Some(params);
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    fn params_from_env() -> Result<ConnectParams, DbError> {
        match std::env::var(DATABASE_URL_ENV) {
            Ok(url) => ConnectParams::from_url(&url),
            Err(_) => Err(DbError::Config(format!(
                "{} is not defined",
                DATABASE_URL_ENV
            ))),
        }
    }

    fn open_connection(params: &ConnectParams) -> Result<Connection, DbError> {
        let to_error = |e: rusqlite::Error| DbError::Connection {
            target: params.database.clone(),
            message: e.to_string(),
        };

        let conn = if params.is_memory() {
            Connection::open_in_memory().map_err(to_error)?
        } else {
            let flags = if params.read_only {
                OpenFlags::SQLITE_OPEN_READ_ONLY
                    | OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX
            } else {
                OpenFlags::default()
            };
            Connection::open_with_flags(Path::new(&params.database), flags).map_err(to_error)?
        };

        Self::configure(&conn, params).map_err(to_error)?;
        Ok(conn)
    }

    /// Configure the database with the settings the bot relies on
    fn configure(conn: &Connection, params: &ConnectParams) -> rusqlite::Result<()> {
        conn.busy_timeout(params.busy_timeout)?;

        if !params.is_memory() && !params.read_only {
            // WAL lets the CLI read while the bot is writing
            let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
            conn.execute("PRAGMA synchronous=NORMAL", [])?;
        }

        conn.execute("PRAGMA foreign_keys=ON", [])?;
        Ok(())
    }

    fn record(&mut self, err: DbError) -> DbError {
        warn!("{}", err);
        self.last_error = Some(err.clone());
        err
    }

    /// Close the connection
    ///
    /// Closing twice is harmless: the second call reports that the
    /// connection was already closed.
    pub fn close(&mut self) -> String {
        match self.conn.take() {
            Some(conn) => {
                if let Err((_conn, e)) = conn.close() {
                    // the handle is dropped either way
                    warn!("Error while closing database: {}", e);
                }
                info!("Database connection closed");
                "Connection closed".to_string()
            }
            None => "Connection already closed".to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// "open" or "closed"
    pub fn status(&self) -> &'static str {
        if self.is_connected() {
            "open"
        } else {
            "closed"
        }
    }

    /// Parameters of the live connection
    pub fn dsn(&self) -> Option<String> {
        if self.is_connected() {
            self.params.as_ref().map(|p| p.dsn())
        } else {
            None
        }
    }

    pub fn last_error(&self) -> Option<&DbError> {
        self.last_error.as_ref()
    }

    /// Check if a table exists in the database
    pub fn table_exists(&self, table_name: &str) -> Result<bool, DbError> {
        let conn = self.conn.as_ref().ok_or(DbError::NotConnected)?;
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table_name],
                |row| row.get(0),
            )
            .map_err(|e| {
                DbError::Statement(StatementError::from_rusqlite(
                    &e,
                    "SELECT COUNT(*) FROM sqlite_master",
                    format!("('{}',)", table_name),
                ))
            })?;
        Ok(count > 0)
    }

    /// Column names of a table, in declaration order
    pub fn table_columns(&self, table_name: &str) -> Result<Vec<String>, DbError> {
        let conn = self.conn.as_ref().ok_or(DbError::NotConnected)?;
        let to_error = |e: rusqlite::Error| {
            DbError::Statement(StatementError::from_rusqlite(
                &e,
                "SELECT name FROM pragma_table_info(?1)",
                format!("('{}',)", table_name),
            ))
        };

        let mut stmt = conn
            .prepare("SELECT name FROM pragma_table_info(?1)")
            .map_err(to_error)?;
        let rows = stmt
            .query_map([table_name], |row| row.get::<_, String>(0))
            .map_err(to_error)?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(to_error)
    }
}

impl Drop for DatabaseConn {
    fn drop(&mut self) {
        if self.conn.is_some() {
            self.close();
        }
    }
}

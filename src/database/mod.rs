//! Database module
//!
//! This module provides all database functionality for ignbot, organized into:
//!
//! - **core**: connection management, statement execution, the result
//!   envelope and the error taxonomy
//! - **players**: the record repository over the `players` table
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/            # Foundation
//! │   ├── connection   # SQLite DatabaseConn (connect, close, last error)
//! │   ├── executor     # fetch_one / fetch_all / commit / custom
//! │   ├── statements   # named statement registry
//! │   ├── response     # DbResponse envelope and row formatting
//! │   └── error        # DbError
//! │
//! └── players/         # Record repository
//!     ├── schema       # players table SQL and registry literal
//!     └── record       # typed PlayerRecord
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use ignbot::database::PlayerDatabase;
//!
//! // Connect using DATABASE_URL
//! let db = PlayerDatabase::from_env()?;
//!
//! let response = db.set_ign("1234", "5678", "Alice", "alice_in_game");
//! println!("{}", response.message);
//!
//! // Callers branch on the error, never on the message text
//! if response.error.is_some() {
//!     // ...
//! }
//! ```

pub mod core;
pub mod players;

pub use core::{
    format_rows, format_tuple, format_value, interpolate, Bindings, ConnectParams, DatabaseConn,
    DbError, DbResponse, ErrorKind, Row, StatementError, StatementKind, StatementRegistry,
    StatementTemplate, DATABASE_URL_ENV, DEFAULT_BUSY_TIMEOUT,
};

pub use players::{PlayerDatabase, PlayerRecord, PlayerSchema, PLAYERS_TABLE, PLAYER_COLUMNS};

/// Ensure the data directory exists
pub fn ensure_data_dir(data_dir: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))
}

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! ignbot - a chat command bot that remembers players
//!
//! ignbot keeps one record per chat user in a single `players` table: their
//! home server, in-game name (IGN), and two free-text notes. Chat commands
//! read and update those records; the bot owner can also manage the table and
//! run raw SQL.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Database layer and configuration | `rusqlite`, `config` |
//! | `bot` | Chat command router and dispatcher | `tokio`, `async-trait`, `futures` |
//! | `display` | Table output for player listings | `tabled` |
//! | `cli` | `ignbot` binary | All above + `clap`, `tracing-subscriber` |
//!
//! ```toml
//! # Database layer only
//! ignbot = { version = "0.3", default-features = false }
//!
//! # Embed the command surface in another bot host
//! ignbot = { version = "0.3", default-features = false, features = ["bot"] }
//! ```
//!
//! # Architecture
//!
//! - **[`database`]**: connection manager, statement executor, result envelope
//!   and the players record repository
//! - **[`config`]**: configuration file and environment settings
//! - **`bot`**: command router and dispatcher (feature `bot`)
//! - **`output`**: table/JSON rendering of player rows (feature `display`)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ignbot::database::PlayerDatabase;
//!
//! let db = PlayerDatabase::open_path("/var/lib/ignbot/players.sqlite3")?;
//!
//! let response = db.set_ign("1234", "5678", "Alice", "alice_in_game");
//! println!("{}", response.message); // IGN for Alice set to alice_in_game
//!
//! let listing = db.read_all();
//! println!("{}", listing.message); // 1 records retrieved ...
//! ```
//!
//! ## Chat Dispatch (feature = "bot")
//!
//! ```rust,ignore
//! use ignbot::bot::{create_dispatcher, ChatMessage};
//! use std::sync::Arc;
//!
//! let dispatcher = create_dispatcher(Arc::new(db), config);
//! let reply = dispatcher
//!     .dispatch(ChatMessage::new("1234", "Alice", ",ping"))
//!     .await;
//! assert_eq!(reply.as_deref(), Some("Pong!"));
//! ```

pub mod config;
pub mod database;

// Command surface - feature gated
#[cfg(feature = "bot")]
pub mod bot;

// Output rendering - requires display feature
#[cfg(feature = "display")]
pub mod output;

// =============================================================================
// Configuration (always available)
// =============================================================================

pub use config::BotConfig;
pub use config::{format_size, get_database_info, DatabaseInfo};

// =============================================================================
// Database Module - Re-export commonly used types (always available)
// =============================================================================

// Record repository
pub use database::{PlayerDatabase, PlayerRecord};

// Core database types
pub use database::{ConnectParams, DatabaseConn, DbError, DbResponse, ErrorKind, Row};

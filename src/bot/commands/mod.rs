//! Chat command handlers
//!
//! Handlers are organized by audience:
//!
//! - `general` - ping, about
//! - `player` - commands acting on the author's own record (db_getrow, home, ign, local, global)
//! - `admin` - owner-only table management and raw SQL (db_create, db_drop, db_addcol,
//!   db_dropcol, db_read, sql, sql_fetch)
//!
//! `help` is answered by the dispatcher itself.

pub mod admin;
pub mod general;
pub mod player;

pub use admin::{
    DbAddColumnCommand, DbCreateCommand, DbDropColumnCommand, DbDropCommand, DbReadCommand,
    SqlCommand, SqlFetchCommand,
};
pub use general::{AboutCommand, PingCommand, ABOUT_TEXT};
pub use player::{DbGetRowCommand, GlobalCommand, HomeCommand, IgnCommand, LocalCommand};

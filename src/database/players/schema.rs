//! Players table definitions
//!
//! All SQL touching the `players` table is defined here. Upserts and listing
//! reads are exposed as named templates so the repository can dispatch them
//! through `DatabaseConn::custom` with call-specific error text.

use crate::database::core::{StatementKind, StatementRegistry, StatementTemplate};

/// Name of the only table the bot manages
pub const PLAYERS_TABLE: &str = "players";

/// Columns present right after `CREATE TABLE`, in order
pub const PLAYER_COLUMNS: &[&str] = &[
    "discord_id",
    "server_id",
    "discord_name",
    "ign",
    "local_data",
    "global_data",
];

/// Column types accepted by `add_column`
pub const SUPPORTED_COLUMN_TYPES: &[&str] = &["TEXT"];

/// SQL for the players table
pub struct PlayerSchema;

impl PlayerSchema {
    pub const CREATE_TABLE: &'static str = r#"CREATE TABLE players (
            discord_id TEXT PRIMARY KEY,
            server_id TEXT,
            discord_name TEXT,
            ign TEXT,
            local_data TEXT,
            global_data TEXT
        )"#;

    pub const DROP_TABLE: &'static str = "DROP TABLE IF EXISTS players";

    pub const SELECT_ALL: &'static str = "SELECT * FROM players";

    pub const SELECT_BY_KEY: &'static str = "SELECT * FROM players WHERE discord_id = :discord_id";

    pub const SELECT_RECORD: &'static str = "SELECT discord_id, server_id, discord_name, ign, local_data, global_data
         FROM players WHERE discord_id = ?1";

    pub const UPSERT_HOME_SERVER: &'static str = "INSERT INTO players (discord_id, server_id, discord_name)
         VALUES (:discord_id, :server_id, :discord_name)
         ON CONFLICT (discord_id) DO UPDATE SET server_id = excluded.server_id";

    pub const UPSERT_IGN: &'static str = "INSERT INTO players (discord_id, server_id, discord_name, ign)
         VALUES (:discord_id, :server_id, :discord_name, :ign)
         ON CONFLICT (discord_id) DO UPDATE SET ign = excluded.ign";

    pub const UPSERT_LOCAL_DATA: &'static str = "INSERT INTO players (discord_id, discord_name, local_data)
         VALUES (:discord_id, :discord_name, :local_data)
         ON CONFLICT (discord_id) DO UPDATE SET local_data = excluded.local_data";

    pub const UPSERT_GLOBAL_DATA: &'static str = "INSERT INTO players (discord_id, discord_name, global_data)
         VALUES (:discord_id, :discord_name, :global_data)
         ON CONFLICT (discord_id) DO UPDATE SET global_data = excluded.global_data";

    /// `ALTER TABLE` for a column that already passed identifier validation
    pub fn add_column(name: &str, kind: &str) -> String {
        format!("ALTER TABLE players ADD COLUMN {} {}", name, kind)
    }

    /// `ALTER TABLE` for a column that already passed identifier validation
    pub fn drop_column(name: &str) -> String {
        format!("ALTER TABLE players DROP COLUMN {}", name)
    }
}

/// Registry names of the player statements
pub mod names {
    pub const SET_HOME_SERVER: &str = "set_home_server";
    pub const SET_IGN: &str = "set_ign";
    pub const SET_LOCAL_DATA: &str = "set_local_data";
    pub const SET_GLOBAL_DATA: &str = "set_global_data";
    pub const READ_PLAYER: &str = "read_player";
    pub const READ_PLAYERS: &str = "read_players";
}

impl StatementRegistry {
    /// Registry with every player statement
    pub fn players() -> Self {
        let mut registry = StatementRegistry::new();
        registry
            .register(
                names::SET_HOME_SERVER,
                StatementTemplate::new(
                    StatementKind::Commit,
                    PlayerSchema::UPSERT_HOME_SERVER,
                    "Failed to set home server {server_id} for {discord_name}",
                ),
            )
            .register(
                names::SET_IGN,
                StatementTemplate::new(
                    StatementKind::Commit,
                    PlayerSchema::UPSERT_IGN,
                    "Failed to set ign {ign} for {discord_name}",
                ),
            )
            .register(
                names::SET_LOCAL_DATA,
                StatementTemplate::new(
                    StatementKind::Commit,
                    PlayerSchema::UPSERT_LOCAL_DATA,
                    "Failed to set local data for {discord_name}",
                ),
            )
            .register(
                names::SET_GLOBAL_DATA,
                StatementTemplate::new(
                    StatementKind::Commit,
                    PlayerSchema::UPSERT_GLOBAL_DATA,
                    "Failed to set global data for {discord_name}",
                ),
            )
            .register(
                names::READ_PLAYER,
                StatementTemplate::new(
                    StatementKind::FetchAll,
                    PlayerSchema::SELECT_BY_KEY,
                    "Failed to read row for {discord_id}",
                ),
            )
            .register(
                names::READ_PLAYERS,
                StatementTemplate::new(
                    StatementKind::FetchAll,
                    PlayerSchema::SELECT_ALL,
                    "Failed to read table players",
                ),
            );
        registry
    }
}

/// Whether `name` is a plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`
///
/// Column names cannot be bound as parameters, so anything else is refused
/// before it reaches an `ALTER TABLE`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

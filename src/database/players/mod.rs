//! Player database
//!
//! `PlayerDatabase` is the record repository behind the bot's commands. It owns
//! one [`DatabaseConn`] and exposes a fixed set of operations over the
//! `players` table. Every operation returns a [`DbResponse`]; none of them
//! panic or propagate errors, so a command handler can always relay
//! `response.message` to the channel.
//!
//! # Concurrency
//!
//! The connection sits behind a mutex and each operation holds the lock for
//! exactly one statement. Concurrent commands are therefore serialized. Share
//! the database between handlers with an `Arc<PlayerDatabase>`.

mod record;
mod schema;

pub use record::PlayerRecord;
pub use schema::{
    is_identifier, names, PlayerSchema, PLAYERS_TABLE, PLAYER_COLUMNS, SUPPORTED_COLUMN_TYPES,
};

use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Value;
use tracing::info;

use crate::database::core::{
    format_rows, ConnectParams, DatabaseConn, DbError, DbResponse, Row, StatementRegistry,
};

/// Record repository for the `players` table
pub struct PlayerDatabase {
    db: Mutex<DatabaseConn>,
    statements: StatementRegistry,
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

impl PlayerDatabase {
    /// Wrap an existing connection manager
    pub fn new(db: DatabaseConn) -> Self {
        Self {
            db: Mutex::new(db),
            statements: StatementRegistry::players(),
        }
    }

    /// Connect with explicit parameters, or from `DATABASE_URL` when `None`
    pub fn connect(params: Option<&ConnectParams>) -> Result<Self, DbError> {
        DatabaseConn::open(params).map(Self::new)
    }

    /// Connect using `DATABASE_URL`
    pub fn from_env() -> Result<Self, DbError> {
        Self::connect(None)
    }

    /// Create an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, DbError> {
        DatabaseConn::open_in_memory().map(Self::new)
    }

    /// Open a database file and make sure the players table exists
    pub fn open_path(path: &str) -> Result<Self, DbError> {
        let db = Self::connect(Some(&ConnectParams::new(path)))?;
        if !db.table_exists()? {
            info!("Initializing players table in {}", path);
            db.create_table().into_result()?;
        }
        Ok(db)
    }

    fn lock(&self) -> MutexGuard<'_, DatabaseConn> {
        // a panicking holder cannot leave a statement half-applied: every
        // commit runs in its own transaction
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Named statements available to `custom`
    pub fn statements(&self) -> &StatementRegistry {
        &self.statements
    }

    // =========================================================================
    // Connection
    // =========================================================================

    /// Close the connection; repeat calls report "Connection already closed"
    pub fn close(&self) -> String {
        self.lock().close()
    }

    pub fn is_connected(&self) -> bool {
        self.lock().is_connected()
    }

    /// One-line connection status for operators
    pub fn status(&self) -> String {
        let db = self.lock();
        match db.dsn() {
            Some(dsn) => format!("Connection {} ({})", db.status(), dsn),
            None => format!("Connection {}", db.status()),
        }
    }

    pub fn last_error(&self) -> Option<DbError> {
        self.lock().last_error().cloned()
    }

    pub fn table_exists(&self) -> Result<bool, DbError> {
        self.lock().table_exists(PLAYERS_TABLE)
    }

    /// Current column names of the players table
    pub fn columns(&self) -> Result<Vec<String>, DbError> {
        self.lock().table_columns(PLAYERS_TABLE)
    }

    // =========================================================================
    // Schema
    // =========================================================================

    pub fn create_table(&self) -> DbResponse<()> {
        self.lock()
            .commit(
                PlayerSchema::CREATE_TABLE,
                &[],
                Some("Failed to create table players"),
            )
            .with_success_message("Table players created")
    }

    pub fn drop_table(&self) -> DbResponse<()> {
        self.lock()
            .commit(
                PlayerSchema::DROP_TABLE,
                &[],
                Some("Failed to drop table players"),
            )
            .with_success_message("Table players dropped")
    }

    /// Add a column; only `TEXT` columns are supported
    pub fn add_column(&self, name: &str, kind: &str) -> DbResponse<()> {
        let kind = kind.trim().to_ascii_uppercase();
        if !SUPPORTED_COLUMN_TYPES.contains(&kind.as_str()) {
            return DbResponse::from_error(DbError::Unsupported(format!(
                "column type '{}' is not supported (supported: {})",
                kind,
                SUPPORTED_COLUMN_TYPES.join(", ")
            )));
        }
        if !is_identifier(name) {
            return DbResponse::from_error(invalid_column(name));
        }

        let sql = PlayerSchema::add_column(name, &kind);
        let error = format!("Failed to add column {} {}", name, kind);
        self.lock()
            .commit(&sql, &[], Some(&error))
            .with_success_message(format!("Column {} {} added", name, kind))
    }

    pub fn drop_column(&self, name: &str) -> DbResponse<()> {
        if !is_identifier(name) {
            return DbResponse::from_error(invalid_column(name));
        }

        let sql = PlayerSchema::drop_column(name);
        let error = format!("Failed to drop column {}", name);
        self.lock()
            .commit(&sql, &[], Some(&error))
            .with_success_message(format!("Column {} dropped", name))
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Every row, formatted as a numbered listing
    pub fn read_all(&self) -> DbResponse<Vec<Row>> {
        with_listing(self.custom(names::READ_PLAYERS, &[]))
    }

    /// Rows for one discord id (zero or one in practice)
    pub fn read_by_key(&self, discord_id: &str) -> DbResponse<Vec<Row>> {
        with_listing(self.custom(names::READ_PLAYER, &[("discord_id", text(discord_id))]))
    }

    /// Typed lookup of one player
    pub fn find_player(&self, discord_id: &str) -> DbResponse<PlayerRecord> {
        let error = format!("Failed to read player {}", discord_id);
        let response =
            self.lock()
                .fetch_one(PlayerSchema::SELECT_RECORD, &[text(discord_id)], Some(&error));
        if let Some(e) = response.error {
            return DbResponse::failure(e, response.message);
        }

        match response.data.as_ref().and_then(PlayerRecord::from_row) {
            Some(record) => {
                let message = record.summary();
                DbResponse::success(Some(record), message)
            }
            None => DbResponse::success(None, format!("No record for {}", discord_id)),
        }
    }

    // =========================================================================
    // Upserts
    // =========================================================================

    /// Set the home server; on an existing record only `server_id` changes
    pub fn set_home_server(
        &self,
        discord_id: &str,
        server_id: &str,
        discord_name: &str,
    ) -> DbResponse<()> {
        self.upsert(
            names::SET_HOME_SERVER,
            &[
                ("discord_id", text(discord_id)),
                ("server_id", text(server_id)),
                ("discord_name", text(discord_name)),
            ],
            format!("Home server for {} set to {}", discord_name, server_id),
        )
    }

    /// Set the in-game name; on an existing record only `ign` changes
    pub fn set_ign(
        &self,
        discord_id: &str,
        server_id: &str,
        discord_name: &str,
        ign: &str,
    ) -> DbResponse<()> {
        self.upsert(
            names::SET_IGN,
            &[
                ("discord_id", text(discord_id)),
                ("server_id", text(server_id)),
                ("discord_name", text(discord_name)),
                ("ign", text(ign)),
            ],
            format!("IGN for {} set to {}", discord_name, ign),
        )
    }

    /// Set server-scoped free text; on an existing record only `local_data` changes
    pub fn set_local_data(&self, discord_id: &str, discord_name: &str, data: &str) -> DbResponse<()> {
        self.upsert(
            names::SET_LOCAL_DATA,
            &[
                ("discord_id", text(discord_id)),
                ("discord_name", text(discord_name)),
                ("local_data", text(data)),
            ],
            format!("Local data for {} saved", discord_name),
        )
    }

    /// Set shared free text; on an existing record only `global_data` changes
    pub fn set_global_data(
        &self,
        discord_id: &str,
        discord_name: &str,
        data: &str,
    ) -> DbResponse<()> {
        self.upsert(
            names::SET_GLOBAL_DATA,
            &[
                ("discord_id", text(discord_id)),
                ("discord_name", text(discord_name)),
                ("global_data", text(data)),
            ],
            format!("Global data for {} saved", discord_name),
        )
    }

    fn upsert(&self, name: &str, params: &[(&str, Value)], success: String) -> DbResponse<()> {
        self.custom(name, params)
            .map(|_| ())
            .with_success_message(success)
    }

    /// Run a registered statement by name
    pub fn custom(&self, name: &str, params: &[(&str, Value)]) -> DbResponse<Vec<Row>> {
        self.lock().custom(&self.statements, name, params)
    }

    // =========================================================================
    // Raw SQL
    // =========================================================================

    /// Execute and commit arbitrary SQL
    ///
    /// No validation is performed. Only expose this to privileged callers.
    pub fn raw_commit(&self, sql: &str) -> DbResponse<()> {
        self.lock().commit(sql, &[], None)
    }

    /// Run an arbitrary query and list the rows
    ///
    /// No validation is performed. Only expose this to privileged callers.
    pub fn raw_fetch(&self, sql: &str) -> DbResponse<Vec<Row>> {
        let response = self.lock().fetch_all(sql, &[], None);
        with_listing(response)
    }
}

fn invalid_column(name: &str) -> DbError {
    DbError::Unsupported(format!("'{}' is not a valid column name", name))
}

/// Replace the message of a successful read with the numbered row listing
fn with_listing(response: DbResponse<Vec<Row>>) -> DbResponse<Vec<Row>> {
    let listing = match &response.data {
        Some(rows) if response.is_ok() => format_rows(rows),
        _ => return response,
    };
    response.with_success_message(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::ErrorKind;

    fn setup() -> PlayerDatabase {
        let db = PlayerDatabase::open_in_memory().unwrap();
        let r = db.create_table();
        assert!(r.is_ok(), "{}", r.message);
        db
    }

    fn count_rows(db: &PlayerDatabase, discord_id: &str) -> usize {
        db.read_by_key(discord_id).data.unwrap().len()
    }

    #[test]
    fn test_create_table_twice() {
        let db = setup();
        assert!(db.table_exists().unwrap());
        let r = db.create_table();
        assert!(r.is_err());
        assert!(r.message.starts_with("Failed to create table players\n"));
        assert!(r.message.contains("already exists"));
    }

    #[test]
    fn test_drop_table_is_idempotent() {
        let db = setup();
        assert!(db.drop_table().is_ok());
        assert!(!db.table_exists().unwrap());
        let r = db.drop_table();
        assert!(r.is_ok());
        assert_eq!(r.message, "Table players dropped");
    }

    #[test]
    fn test_read_all_empty() {
        let db = setup();
        let r = db.read_all();
        assert!(r.is_ok());
        assert_eq!(r.message, "0 records retrieved");
        assert_eq!(r.data, Some(vec![]));
    }

    #[test]
    fn test_read_all_listing() {
        let db = setup();
        assert!(db.set_home_server("1", "S1", "Alice").is_ok());
        assert!(db.set_ign("2", "S2", "Bob", "bobby").is_ok());

        let r = db.read_all();
        let lines: Vec<&str> = r.message.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "2 records retrieved");
        assert_eq!(lines[1], "1: ('1', 'S1', 'Alice', NULL, NULL, NULL)");
        assert_eq!(lines[2], "2: ('2', 'S2', 'Bob', 'bobby', NULL, NULL)");
    }

    #[test]
    fn test_set_ign_twice_keeps_one_record() {
        let db = setup();
        assert!(db.set_ign("42", "S1", "Alice", "first").is_ok());
        let r = db.set_ign("42", "S1", "Alice", "second");
        assert!(r.is_ok());
        assert_eq!(r.message, "IGN for Alice set to second");

        assert_eq!(count_rows(&db, "42"), 1);
        let record = db.find_player("42").data.unwrap();
        assert_eq!(record.ign.as_deref(), Some("second"));
    }

    #[test]
    fn test_set_home_server_then_read_by_key() {
        let db = setup();
        assert!(db.set_home_server("42", "S1", "Alice").is_ok());

        let r = db.read_by_key("42");
        let rows = r.data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], text("S1"));
        assert_eq!(rows[0][2], text("Alice"));
        assert_eq!(
            r.message,
            "1 records retrieved\n1: ('42', 'S1', 'Alice', NULL, NULL, NULL)"
        );
    }

    #[test]
    fn test_upserts_touch_only_their_field() {
        let db = setup();
        assert!(db.set_ign("42", "S1", "Alice", "ally").is_ok());
        assert!(db.set_home_server("42", "S2", "Alice2").is_ok());
        assert!(db.set_local_data("42", "Alice3", "local note").is_ok());
        assert!(db.set_global_data("42", "Alice4", "global note").is_ok());

        let record = db.find_player("42").data.unwrap();
        assert_eq!(
            record,
            PlayerRecord {
                discord_id: "42".into(),
                server_id: Some("S2".into()),
                discord_name: Some("Alice".into()),
                ign: Some("ally".into()),
                local_data: Some("local note".into()),
                global_data: Some("global note".into()),
            }
        );
    }

    #[test]
    fn test_upsert_values_are_bound() {
        let db = setup();
        let sneaky = "x'); DROP TABLE players; --";
        assert!(db.set_local_data("42", "Alice", sneaky).is_ok());
        assert!(db.table_exists().unwrap());
        let record = db.find_player("42").data.unwrap();
        assert_eq!(record.local_data.as_deref(), Some(sneaky));
    }

    #[test]
    fn test_upsert_without_table() {
        let db = PlayerDatabase::open_in_memory().unwrap();
        let r = db.set_ign("42", "S1", "Alice", "ally");
        assert_eq!(r.error.as_ref().unwrap().kind(), ErrorKind::Statement);
        assert!(r.message.starts_with("Failed to set ign ally for Alice\n"));
        assert!(r.message.contains("no such table: players"));
    }

    #[test]
    fn test_add_and_drop_column_restores_schema() {
        let db = setup();
        let before = db.columns().unwrap();
        assert_eq!(before, PLAYER_COLUMNS);

        let r = db.add_column("x", "TEXT");
        assert!(r.is_ok(), "{}", r.message);
        assert!(db.columns().unwrap().contains(&"x".to_string()));

        let r = db.drop_column("x");
        assert!(r.is_ok(), "{}", r.message);
        assert_eq!(db.columns().unwrap(), before);
    }

    #[test]
    fn test_add_column_unsupported_type() {
        let db = setup();
        let r = db.add_column("x", "INTEGER");
        assert_eq!(r.error.as_ref().unwrap().kind(), ErrorKind::Unsupported);
        assert!(r.message.contains("INTEGER"));
        assert!(!db.columns().unwrap().contains(&"x".to_string()));
        // nothing reached the connection
        assert_eq!(db.last_error(), None);
    }

    #[test]
    fn test_column_name_validation() {
        let db = setup();
        let r = db.add_column("x TEXT; DROP TABLE players", "text");
        assert_eq!(r.error.unwrap().kind(), ErrorKind::Unsupported);
        let r = db.drop_column("1x");
        assert_eq!(r.error.unwrap().kind(), ErrorKind::Unsupported);
        assert!(db.table_exists().unwrap());
    }

    #[test]
    fn test_duplicate_insert_reports_statement() {
        let db = setup();
        let sql = "INSERT INTO players (discord_id) VALUES ('7')";
        assert!(db.raw_commit(sql).is_ok());

        let r = db.raw_commit(sql);
        assert!(r.is_err());
        assert!(r.message.contains(sql));
        assert!(db.last_error().is_some());

        // still usable afterwards
        assert!(db.set_ign("8", "S1", "Carol", "carol").is_ok());
        assert!(db.read_all().message.starts_with("2 records retrieved"));
    }

    #[test]
    fn test_raw_commit_with_returning() {
        let db = setup();
        let r = db.raw_commit("INSERT INTO players (discord_id) VALUES ('1') RETURNING discord_id");
        assert!(r.is_ok(), "{}", r.message);
        assert!(db.read_all().message.starts_with("1 records retrieved"));

        assert!(db.raw_commit("SELECT 1").is_ok());
        assert!(db.raw_commit("PRAGMA user_version = 3").is_ok());
        assert_eq!(db.last_error(), None);
    }

    #[test]
    fn test_raw_commit_several_statements() {
        let db = setup();
        let r = db.raw_commit(
            "INSERT INTO players (discord_id) VALUES ('1'); \
             UPDATE players SET ign = 'ally' WHERE discord_id = '1'",
        );
        assert!(r.is_ok(), "{}", r.message);
        let record = db.find_player("1").data.unwrap();
        assert_eq!(record.ign.as_deref(), Some("ally"));

        let r = db.raw_commit(
            "INSERT INTO players (discord_id) VALUES ('2'); INSERT INTO nowhere VALUES (1)",
        );
        assert!(r.message.contains("no such table: nowhere"), "{}", r.message);
        assert_eq!(count_rows(&db, "2"), 0);
    }

    #[test]
    fn test_reads_use_registered_error_text() {
        let db = setup();
        assert_eq!(db.read_by_key("9").message, "0 records retrieved");

        assert!(db.drop_table().is_ok());
        let r = db.read_all();
        assert!(r.message.starts_with("Failed to read table players\n"), "{}", r.message);
        let r = db.read_by_key("9");
        assert!(r.message.starts_with("Failed to read row for 9\n"), "{}", r.message);
        match r.error {
            Some(DbError::Statement(e)) => assert_eq!(e.params, "('9',)"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_raw_fetch() {
        let db = setup();
        assert!(db.set_ign("1", "S1", "Alice", "ally").is_ok());
        let r = db.raw_fetch("SELECT ign FROM players");
        assert_eq!(r.message, "1 records retrieved\n1: ('ally',)");
    }

    #[test]
    fn test_find_player_missing() {
        let db = setup();
        let r = db.find_player("nobody");
        assert!(r.is_ok());
        assert_eq!(r.data, None);
        assert_eq!(r.message, "No record for nobody");
    }

    #[test]
    fn test_close_twice() {
        let db = setup();
        assert_eq!(db.close(), "Connection closed");
        assert_eq!(db.close(), "Connection already closed");
        assert!(!db.is_connected());
        assert_eq!(db.status(), "Connection closed");

        let r = db.read_all();
        assert_eq!(r.error, Some(DbError::NotConnected));
    }

    #[test]
    fn test_custom_unknown() {
        let db = setup();
        let r = db.custom("truncate_everything", &[]);
        assert_eq!(r.error.unwrap().kind(), ErrorKind::UnknownStatement);
    }

    #[test]
    fn test_open_path_initializes_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.sqlite3");
        let path = path.to_string_lossy();

        let db = PlayerDatabase::open_path(&path).unwrap();
        assert!(db.table_exists().unwrap());
        assert!(db.set_ign("1", "S1", "Alice", "ally").is_ok());
        db.close();

        // reopening keeps existing rows
        let db = PlayerDatabase::open_path(&path).unwrap();
        assert_eq!(count_rows(&db, "1"), 1);
    }

    #[test]
    fn test_open_path_reports_create_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.sqlite3");
        let path = path.to_string_lossy();

        // a view by that name is not a table, and blocks CREATE TABLE
        let db = PlayerDatabase::connect(Some(&ConnectParams::new(path.to_string()))).unwrap();
        assert!(db.raw_commit("CREATE VIEW players AS SELECT 1 AS discord_id").is_ok());
        db.close();

        match PlayerDatabase::open_path(&path) {
            Err(DbError::Statement(e)) => assert!(e.driver_message.contains("already exists")),
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }
}

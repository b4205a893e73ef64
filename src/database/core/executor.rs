//! Statement execution
//!
//! Three primitives run a statement over the managed connection: `fetch_one`,
//! `fetch_all` and `commit`. All of them return a [`DbResponse`]; a driver
//! error is captured, formatted, stored as the connection's last error and
//! never propagated.
//!
//! Values are always bound, never spliced into the SQL text.

use rusqlite::types::Value;
use rusqlite::fallible_iterator::FallibleIterator;
use rusqlite::{Batch, Connection, Statement};
use tracing::{debug, warn};

use super::connection::DatabaseConn;
use super::error::{DbError, StatementError};
use super::response::{format_tuple, DbResponse, Row};
use super::statements::{interpolate, StatementKind, StatementRegistry};

/// Parameters bound to a statement
#[derive(Debug, Clone, Copy)]
pub enum Bindings<'a> {
    /// `?1`, `?2`, ... in order
    Positional(&'a [Value]),
    /// `:name` placeholders; names are given without the colon
    Named(&'a [(&'a str, Value)]),
}

impl Bindings<'_> {
    /// Render the bound values as a tuple for messages
    pub fn render(&self) -> String {
        match self {
            Bindings::Positional(values) => format_tuple(values),
            Bindings::Named(pairs) => {
                let values: Vec<Value> = pairs.iter().map(|(_, v)| v.clone()).collect();
                format_tuple(&values)
            }
        }
    }

    fn bind(&self, stmt: &mut Statement<'_>) -> rusqlite::Result<()> {
        match self {
            Bindings::Positional(values) => {
                let expected = stmt.parameter_count();
                if values.len() != expected {
                    return Err(rusqlite::Error::InvalidParameterCount(values.len(), expected));
                }
                for (i, value) in values.iter().enumerate() {
                    stmt.raw_bind_parameter(i + 1, value)?;
                }
            }
            Bindings::Named(pairs) => {
                for (name, value) in pairs.iter() {
                    let placeholder = format!(":{}", name);
                    // unused names are allowed so one parameter set can serve
                    // several templates
                    if let Some(index) = stmt.parameter_index(&placeholder)? {
                        stmt.raw_bind_parameter(index, value)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn collect_rows(stmt: &mut Statement<'_>, limit: Option<usize>) -> rusqlite::Result<Vec<Row>> {
    let column_count = stmt.column_count();
    let mut rows = stmt.raw_query();
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(row.get::<_, Value>(i)?);
        }
        out.push(values);
        if limit.is_some_and(|l| out.len() >= l) {
            break;
        }
    }

    Ok(out)
}

fn query_rows(
    conn: &Connection,
    sql: &str,
    bindings: Bindings<'_>,
    limit: Option<usize>,
) -> rusqlite::Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    bindings.bind(&mut stmt)?;
    collect_rows(&mut stmt, limit)
}

/// Run every statement in `sql` inside one transaction and commit.
///
/// Rows produced along the way (`RETURNING`, `SELECT`, `PRAGMA`) are drained
/// and discarded. Bindings apply to the first statement; any later statement
/// must not take parameters.
fn execute_committed(conn: &Connection, sql: &str, bindings: Bindings<'_>) -> rusqlite::Result<u64> {
    // dropping an uncommitted transaction rolls it back
    let tx = conn.unchecked_transaction()?;
    let before = tx.total_changes();
    let mut batch = Batch::new(&tx, sql);
    let mut first = true;
    while let Some(mut stmt) = batch.next()? {
        if first {
            bindings.bind(&mut stmt)?;
            first = false;
        } else {
            Bindings::Positional(&[]).bind(&mut stmt)?;
        }
        let mut rows = stmt.raw_query();
        while rows.next()?.is_some() {}
    }
    let affected = tx.total_changes() - before;
    tx.commit()?;
    Ok(affected)
}

impl DatabaseConn {
    /// Run a query and return at most one row
    pub fn fetch_one(
        &mut self,
        sql: &str,
        params: &[Value],
        error_message: Option<&str>,
    ) -> DbResponse<Row> {
        self.fetch_one_with(sql, Bindings::Positional(params), error_message)
    }

    /// Run a query and return every row
    pub fn fetch_all(
        &mut self,
        sql: &str,
        params: &[Value],
        error_message: Option<&str>,
    ) -> DbResponse<Vec<Row>> {
        self.fetch_all_with(sql, Bindings::Positional(params), error_message)
    }

    /// Execute a statement and commit it
    pub fn commit(
        &mut self,
        sql: &str,
        params: &[Value],
        error_message: Option<&str>,
    ) -> DbResponse<()> {
        self.commit_with(sql, Bindings::Positional(params), error_message)
    }

    pub fn fetch_one_with(
        &mut self,
        sql: &str,
        bindings: Bindings<'_>,
        error_message: Option<&str>,
    ) -> DbResponse<Row> {
        self.fetch_all_limited(sql, bindings, error_message, Some(1))
            .map(|rows| rows.into_iter().next())
            .flatten_data()
    }

    pub fn fetch_all_with(
        &mut self,
        sql: &str,
        bindings: Bindings<'_>,
        error_message: Option<&str>,
    ) -> DbResponse<Vec<Row>> {
        self.fetch_all_limited(sql, bindings, error_message, None)
    }

    fn fetch_all_limited(
        &mut self,
        sql: &str,
        bindings: Bindings<'_>,
        error_message: Option<&str>,
        limit: Option<usize>,
    ) -> DbResponse<Vec<Row>> {
        let Some(conn) = self.conn.as_ref() else {
            return self.not_connected();
        };

        debug!("fetch: {} {}", sql, bindings.render());
        match query_rows(conn, sql, bindings, limit) {
            Ok(rows) => {
                debug!("fetched {} rows", rows.len());
                DbResponse::success(Some(rows), success_message(sql, &bindings))
            }
            Err(e) => self.statement_failure(&e, sql, &bindings, error_message),
        }
    }

    pub fn commit_with(
        &mut self,
        sql: &str,
        bindings: Bindings<'_>,
        error_message: Option<&str>,
    ) -> DbResponse<()> {
        let Some(conn) = self.conn.as_ref() else {
            return self.not_connected();
        };

        debug!("commit: {} {}", sql, bindings.render());
        match execute_committed(conn, sql, bindings) {
            Ok(affected) => {
                debug!("committed, {} rows affected", affected);
                DbResponse::success(None, success_message(sql, &bindings))
            }
            Err(e) => self.statement_failure(&e, sql, &bindings, error_message),
        }
    }

    /// Run a registered statement by name
    ///
    /// `params` are bound to the template's `:name` placeholders and also
    /// substituted into its `{name}` error template. A fetch-one hit comes
    /// back as a single-row vector; commits carry no data.
    pub fn custom(
        &mut self,
        registry: &StatementRegistry,
        name: &str,
        params: &[(&str, Value)],
    ) -> DbResponse<Vec<Row>> {
        let Some(template) = registry.get(name) else {
            warn!("statement '{}' is not registered", name);
            return DbResponse::from_error(DbError::UnknownStatement(name.to_string()));
        };

        let error_message = interpolate(template.error, params);
        let bindings = Bindings::Named(params);

        match template.kind {
            StatementKind::FetchOne => self
                .fetch_one_with(template.sql, bindings, Some(&error_message))
                .map(|row| vec![row]),
            StatementKind::FetchAll => {
                self.fetch_all_with(template.sql, bindings, Some(&error_message))
            }
            StatementKind::Commit => self
                .commit_with(template.sql, bindings, Some(&error_message))
                .map(|()| Vec::new()),
        }
    }

    fn not_connected<T>(&mut self) -> DbResponse<T> {
        self.last_error = Some(DbError::NotConnected);
        DbResponse::from_error(DbError::NotConnected)
    }

    fn statement_failure<T>(
        &mut self,
        err: &rusqlite::Error,
        sql: &str,
        bindings: &Bindings<'_>,
        error_message: Option<&str>,
    ) -> DbResponse<T> {
        let captured = StatementError::from_rusqlite(err, sql, bindings.render());
        let header = match error_message {
            Some(m) => m.to_string(),
            None => format!("Failed to execute \"{}\" with params {}", sql, captured.params),
        };
        let message = format!("{}\n{}", header, captured.diagnostic());
        warn!("{}", message);

        let error = DbError::Statement(captured);
        self.last_error = Some(error.clone());
        DbResponse::failure(error, message)
    }
}

fn success_message(sql: &str, bindings: &Bindings<'_>) -> String {
    format!("Executed \"{}\" with params {}", sql, bindings.render())
}

impl<T> DbResponse<Option<T>> {
    fn flatten_data(self) -> DbResponse<T> {
        DbResponse {
            data: self.data.flatten(),
            message: self.message,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::{ErrorKind, StatementTemplate};

    fn setup() -> DatabaseConn {
        let mut db = DatabaseConn::open_in_memory().unwrap();
        let r = db.commit(
            "CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)",
            &[],
            None,
        );
        assert!(r.is_ok(), "{}", r.message);
        db
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_commit_and_fetch() {
        let mut db = setup();
        let r = db.commit(
            "INSERT INTO kv (k, v) VALUES (?1, ?2)",
            &[text("a"), text("1")],
            None,
        );
        assert!(r.is_ok());
        assert_eq!(r.data, None);
        assert_eq!(
            r.message,
            "Executed \"INSERT INTO kv (k, v) VALUES (?1, ?2)\" with params ('a', '1')"
        );

        let one = db.fetch_one("SELECT v FROM kv WHERE k = ?1", &[text("a")], None);
        assert_eq!(one.data, Some(vec![text("1")]));

        let all = db.fetch_all("SELECT * FROM kv", &[], None);
        assert_eq!(all.data.unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_one_returns_first_of_many() {
        let mut db = setup();
        for (k, v) in [("a", "1"), ("b", "2"), ("c", "3")] {
            let r = db.commit("INSERT INTO kv (k, v) VALUES (?1, ?2)", &[text(k), text(v)], None);
            assert!(r.is_ok(), "{}", r.message);
        }

        let r = db.fetch_one("SELECT * FROM kv ORDER BY k", &[], None);
        assert_eq!(r.error, None);
        assert_eq!(r.data, Some(vec![text("a"), text("1")]));
        assert_eq!(r.message, "Executed \"SELECT * FROM kv ORDER BY k\" with params ()");
    }

    #[test]
    fn test_commit_statements_that_return_rows() {
        let mut db = setup();
        let r = db.commit(
            "INSERT INTO kv (k, v) VALUES (?1, ?2) RETURNING k",
            &[text("a"), text("1")],
            None,
        );
        assert!(r.is_ok(), "{}", r.message);
        assert_eq!(r.data, None);

        assert!(db.commit("SELECT * FROM kv", &[], None).is_ok());
        assert!(db.commit("PRAGMA user_version = 3", &[], None).is_ok());

        let version = db.fetch_one("PRAGMA user_version", &[], None);
        assert_eq!(version.data, Some(vec![Value::Integer(3)]));
        let all = db.fetch_all("SELECT * FROM kv", &[], None);
        assert_eq!(all.data, Some(vec![vec![text("a"), text("1")]]));
    }

    #[test]
    fn test_commit_several_statements() {
        let mut db = setup();
        let r = db.commit(
            "INSERT INTO kv (k, v) VALUES ('a', '1'); INSERT INTO kv (k, v) VALUES ('b', '2');",
            &[],
            None,
        );
        assert!(r.is_ok(), "{}", r.message);
        let all = db.fetch_all("SELECT k FROM kv ORDER BY k", &[], None);
        assert_eq!(all.data, Some(vec![vec![text("a")], vec![text("b")]]));

        // a failing statement rolls back the ones before it
        let r = db.commit(
            "INSERT INTO kv (k, v) VALUES ('c', '3'); INSERT INTO kv (k, v) VALUES ('a', '9')",
            &[],
            None,
        );
        assert!(r.is_err());
        assert!(r.message.contains("(Code: 1555)"), "{}", r.message);
        let all = db.fetch_all("SELECT k, v FROM kv ORDER BY k", &[], None);
        assert_eq!(
            all.data,
            Some(vec![vec![text("a"), text("1")], vec![text("b"), text("2")]])
        );
    }

    #[test]
    fn test_commit_binds_first_statement_only() {
        let mut db = setup();
        let r = db.commit(
            "INSERT INTO kv (k, v) VALUES (?1, ?2); INSERT INTO kv (k, v) VALUES (?1, 'x')",
            &[text("a"), text("1")],
            None,
        );
        assert_eq!(r.error.map(|e| e.kind()), Some(ErrorKind::Statement));
        let all = db.fetch_all("SELECT * FROM kv", &[], None);
        assert_eq!(all.data, Some(vec![]));
    }

    #[test]
    fn test_fetch_one_no_row() {
        let mut db = setup();
        let r = db.fetch_one("SELECT * FROM kv WHERE k = ?1", &[text("missing")], None);
        assert!(r.is_ok());
        assert_eq!(r.data, None);
    }

    #[test]
    fn test_fetch_all_empty() {
        let mut db = setup();
        let r = db.fetch_all("SELECT * FROM kv", &[], None);
        assert!(r.is_ok());
        assert_eq!(r.data, Some(vec![]));
    }

    #[test]
    fn test_statement_failure_keeps_connection_usable() {
        let mut db = setup();
        let sql = "INSERT INTO kv (k, v) VALUES (?1, ?2)";
        assert!(db.commit(sql, &[text("a"), text("1")], None).is_ok());

        let r = db.commit(sql, &[text("a"), text("2")], None);
        assert!(r.is_err());
        assert_eq!(r.data, None);
        assert!(r.message.starts_with(&format!("Failed to execute \"{}\"", sql)));
        assert!(r.message.contains("('a', '2')"));
        assert!(r.message.contains("(Code: 1555)"));
        assert!(r.message.contains("(Severity: ERROR)"));
        assert_eq!(db.last_error(), r.error.as_ref());

        // the failed insert was rolled back and later statements still run
        assert!(db.commit(sql, &[text("b"), text("3")], None).is_ok());
        let all = db.fetch_all("SELECT * FROM kv", &[], None);
        assert_eq!(all.data.unwrap().len(), 2);
    }

    #[test]
    fn test_custom_error_header() {
        let mut db = setup();
        let r = db.fetch_all("SELECT nope FROM kv", &[], Some("failed to read kv"));
        assert!(r.is_err());
        assert!(r.message.starts_with("failed to read kv\nError: "));
        assert_eq!(r.error.unwrap().kind(), ErrorKind::Statement);
    }

    #[test]
    fn test_parameter_count_mismatch() {
        let mut db = setup();
        let r = db.commit("INSERT INTO kv (k, v) VALUES (?1, ?2)", &[text("a")], None);
        assert_eq!(r.error.unwrap().kind(), ErrorKind::Statement);
        let all = db.fetch_all("SELECT * FROM kv", &[], None);
        assert_eq!(all.data, Some(vec![]));
    }

    #[test]
    fn test_not_connected() {
        let mut db = setup();
        db.close();
        let r = db.fetch_all("SELECT * FROM kv", &[], None);
        assert_eq!(r.error, Some(DbError::NotConnected));
        assert_eq!(r.message, "Not connected to database");
    }

    #[test]
    fn test_custom_dispatch() {
        let mut registry = StatementRegistry::new();
        registry.register(
            "put",
            StatementTemplate::new(
                StatementKind::Commit,
                "INSERT INTO kv (k, v) VALUES (:k, :v)",
                "failed to store {k}",
            ),
        );
        registry.register(
            "get",
            StatementTemplate::new(
                StatementKind::FetchOne,
                "SELECT v FROM kv WHERE k = :k",
                "failed to read {k}",
            ),
        );

        let mut db = setup();
        let params = [("k", text("a")), ("v", text("1"))];
        let r = db.custom(&registry, "put", &params);
        assert!(r.is_ok());
        assert_eq!(r.data, None);

        let r = db.custom(&registry, "get", &params);
        assert_eq!(r.data, Some(vec![vec![text("1")]]));

        let r = db.custom(&registry, "put", &params);
        assert!(r.message.starts_with("failed to store a\n"));
    }

    #[test]
    fn test_custom_unknown_name() {
        let mut db = setup();
        let r = db.custom(&StatementRegistry::new(), "drop_everything", &[]);
        assert_eq!(
            r.error,
            Some(DbError::UnknownStatement("drop_everything".to_string()))
        );
        assert_eq!(r.message, "Statement \"drop_everything\" not found");
    }
}

//! Uniform call result for database operations
//!
//! Callers branch on [`DbResponse::error`] rather than on `Result`; the
//! `message` field is always a complete, human-readable outcome that can be
//! relayed to a chat channel verbatim.

use rusqlite::types::Value;

use super::error::DbError;

/// A single fetched row, one value per column
pub type Row = Vec<Value>;

/// Result envelope: data, message, error-or-none
#[derive(Debug, Clone, PartialEq)]
pub struct DbResponse<T> {
    pub data: Option<T>,
    pub message: String,
    pub error: Option<DbError>,
}

impl<T> DbResponse<T> {
    /// Successful outcome carrying `data`
    pub fn success(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            error: None,
        }
    }

    /// Failed outcome; data is always absent
    pub fn failure(error: DbError, message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: message.into(),
            error: Some(error),
        }
    }

    /// Failed outcome whose message is the error's own display text
    pub fn from_error(error: DbError) -> Self {
        let message = error.to_string();
        Self::failure(error, message)
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }

    /// Replace the message of a successful response, leaving failures untouched
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        if self.error.is_none() {
            self.message = message.into();
        }
        self
    }

    /// Transform the carried data
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DbResponse<U> {
        DbResponse {
            data: self.data.map(f),
            message: self.message,
            error: self.error,
        }
    }

    /// Convert into a `Result`, dropping the message on success
    pub fn into_result(self) -> Result<Option<T>, DbError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.data),
        }
    }
}

/// Render one value the way it appears inside a row tuple
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => format!("'{}'", s),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// Render a list of values as a tuple: `('a', 1, NULL)`
///
/// A single value keeps a trailing comma, `('a',)`, and an empty list is `()`.
pub fn format_tuple(values: &[Value]) -> String {
    match values {
        [] => "()".to_string(),
        [single] => format!("({},)", format_value(single)),
        _ => {
            let parts: Vec<String> = values.iter().map(format_value).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Numbered listing used for every read operation
///
/// ```text
/// 2 records retrieved
/// 1: ('1', 'S1', 'Alice', NULL, NULL, NULL)
/// 2: ('2', NULL, 'Bob', 'bob_ign', NULL, NULL)
/// ```
pub fn format_rows(rows: &[Row]) -> String {
    let mut lines = vec![format!("{} records retrieved", rows.len())];
    for (i, row) in rows.iter().enumerate() {
        lines.push(format!("{}: {}", i + 1, format_tuple(row)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rows_empty() {
        assert_eq!(format_rows(&[]), "0 records retrieved");
    }

    #[test]
    fn test_format_rows() {
        let rows = vec![
            vec![
                Value::Text("1".into()),
                Value::Text("S1".into()),
                Value::Null,
            ],
            vec![Value::Text("2".into()), Value::Integer(7), Value::Real(1.5)],
        ];
        assert_eq!(
            format_rows(&rows),
            "2 records retrieved\n1: ('1', 'S1', NULL)\n2: ('2', 7, 1.5)"
        );
    }

    #[test]
    fn test_format_tuple_shapes() {
        assert_eq!(format_tuple(&[]), "()");
        assert_eq!(format_tuple(&[Value::Text("x".into())]), "('x',)");
        assert_eq!(format_tuple(&[Value::Blob(vec![0, 1, 2])]), "(<3 bytes>,)");
    }

    #[test]
    fn test_response_helpers() {
        let ok: DbResponse<u32> = DbResponse::success(Some(3), "done");
        assert!(ok.is_ok());
        let ok = ok.with_success_message("three").map(|v| v * 2);
        assert_eq!(ok.message, "three");
        assert_eq!(ok.data, Some(6));

        let failed: DbResponse<u32> = DbResponse::from_error(DbError::NotConnected);
        assert!(failed.is_err());
        let failed = failed.with_success_message("ignored");
        assert_eq!(failed.message, "Not connected to database");
        assert_eq!(failed.into_result(), Err(DbError::NotConnected));
    }
}

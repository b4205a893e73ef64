//! Named statement templates
//!
//! A [`StatementRegistry`] maps a symbolic name to the SQL it runs, the
//! execution mode, and an error template. Only registered statements can be
//! dispatched through `DatabaseConn::custom`, so a name coming from a chat
//! command can never turn into arbitrary SQL.

use std::collections::HashMap;

use rusqlite::types::Value;

/// How a template is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    FetchOne,
    FetchAll,
    Commit,
}

/// A registered statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTemplate {
    pub kind: StatementKind,
    /// SQL using `:name` placeholders
    pub sql: &'static str,
    /// Error header using `{name}` placeholders
    pub error: &'static str,
}

impl StatementTemplate {
    pub const fn new(kind: StatementKind, sql: &'static str, error: &'static str) -> Self {
        Self { kind, sql, error }
    }
}

/// Registry of named statements
#[derive(Debug, Clone, Default)]
pub struct StatementRegistry {
    templates: HashMap<&'static str, StatementTemplate>,
}

impl StatementRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template, replacing any previous one with the same name
    pub fn register(&mut self, name: &'static str, template: StatementTemplate) -> &mut Self {
        self.templates.insert(name, template);
        self
    }

    pub fn get(&self, name: &str) -> Option<&StatementTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.templates.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Substitute `{name}` placeholders in an error template
///
/// Text values are inserted as-is, NULL becomes `NULL`. Placeholders without
/// a matching parameter are left untouched.
pub fn interpolate(template: &str, params: &[(&str, Value)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        let placeholder = format!("{{{}}}", name);
        if !out.contains(&placeholder) {
            continue;
        }
        let text = match value {
            Value::Null => "NULL".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Real(r) => r.to_string(),
            Value::Text(s) => s.clone(),
            Value::Blob(b) => format!("<{} bytes>", b.len()),
        };
        out = out.replace(&placeholder, &text);
    }
    out
}

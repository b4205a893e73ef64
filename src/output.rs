//! Output formatting for CLI listings
//!
//! Player rows carry whatever columns the table currently has, so rendering
//! works from a column list plus dynamic rows instead of a fixed struct.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::str::FromStr;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::database::Row;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty table with borders (default)
    #[default]
    Table,
    /// Markdown table format
    Markdown,
    /// Compact JSON array
    Json,
    /// Pretty-printed JSON with indentation
    JsonPretty,
    /// One JSON object per line
    JsonLine,
    /// Pipe-separated values with header
    Psv,
}

impl OutputFormat {
    /// Check if this is a JSON variant
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty | Self::JsonLine)
    }

    /// Get a list of all format names for help text
    pub fn all_names() -> &'static [&'static str] {
        &[
            "table",
            "markdown",
            "json",
            "json-pretty",
            "json-line",
            "psv",
        ]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Markdown => write!(f, "markdown"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
            Self::JsonLine => write!(f, "json-line"),
            Self::Psv => write!(f, "psv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "pretty" => Ok(Self::Table),
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "json-pretty" | "jsonpretty" => Ok(Self::JsonPretty),
            "json-line" | "jsonline" | "jsonl" | "ndjson" => Ok(Self::JsonLine),
            "psv" | "pipe" => Ok(Self::Psv),
            _ => Err(format!(
                "Unknown output format '{}'. Valid formats: {}",
                s,
                Self::all_names().join(", ")
            )),
        }
    }
}

/// Plain cell text: NULL renders empty, blobs as a byte count
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

/// JSON equivalent of a SQLite value
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Real(r) => JsonValue::from(*r),
        Value::Text(s) => JsonValue::from(s.as_str()),
        Value::Blob(b) => JsonValue::from(b.clone()),
    }
}

/// Rows as JSON objects keyed by column name
///
/// Rows wider than `columns` get positional keys (`col6`, `col7`, ...).
pub fn rows_to_json(columns: &[String], rows: &[Row]) -> Vec<Map<String, JsonValue>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, v)| {
                    let key = columns.get(i).cloned().unwrap_or_else(|| format!("col{}", i));
                    (key, value_to_json(v))
                })
                .collect()
        })
        .collect()
}

/// Serialize a single value for the JSON formats
///
/// Returns `None` for the tabular formats so the caller can print its own
/// layout. `JsonLine` renders one compact line, same as `Json`.
pub fn render_json<T: Serialize>(
    value: &T,
    format: OutputFormat,
) -> Option<Result<String, serde_json::Error>> {
    if !format.is_json() {
        return None;
    }
    Some(match format {
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value),
        _ => serde_json::to_string(value),
    })
}

/// Render rows in the requested format
pub fn render_rows(
    columns: &[String],
    rows: &[Row],
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    let rendered = match format {
        OutputFormat::Table | OutputFormat::Markdown => {
            let mut builder = Builder::default();
            builder.push_record(columns.iter().cloned());
            for row in rows {
                builder.push_record(row.iter().map(cell_text));
            }
            let mut table = builder.build();
            if format == OutputFormat::Markdown {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            table.to_string()
        }
        OutputFormat::Json => serde_json::to_string(&rows_to_json(columns, rows))?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&rows_to_json(columns, rows))?,
        OutputFormat::JsonLine => {
            let mut lines = Vec::with_capacity(rows.len());
            for object in rows_to_json(columns, rows) {
                lines.push(serde_json::to_string(&object)?);
            }
            lines.join("\n")
        }
        OutputFormat::Psv => {
            let mut lines = vec![columns.join("|")];
            for row in rows {
                lines.push(row.iter().map(cell_text).collect::<Vec<_>>().join("|"));
            }
            lines.join("\n")
        }
    };
    Ok(rendered)
}
